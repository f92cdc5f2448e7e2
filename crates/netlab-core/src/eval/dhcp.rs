// ── DHCP address allocation ──
//
// Scans candidate host addresses in ascending order and returns the
// first one that is neither the gateway, explicitly excluded, nor
// already used. The usable range is derived from the pool's actual
// mask (network+1 ..= broadcast-1), so non-/24 pools allocate
// correctly.

use std::net::Ipv4Addr;

use chrono::{Duration, Utc};

use crate::model::{DhcpLease, DhcpPool, MacAddress};

use super::ip::{from_u32, prefix_from_mask, to_u32};

/// First free address in the pool, or `None` when gateway, exclusions,
/// and used addresses cover the entire usable range (or the mask
/// leaves no host addresses at all).
pub fn allocate(pool: &DhcpPool) -> Option<Ipv4Addr> {
    let prefix = prefix_from_mask(pool.mask)?;
    if prefix >= 31 {
        // /31 and /32 have no allocatable host range here.
        return None;
    }
    let mask = to_u32(pool.mask);
    let network = to_u32(pool.network) & mask;
    let broadcast = network | !mask;

    (network + 1..broadcast).map(from_u32).find(|&ip| {
        Some(ip) != pool.gateway && !pool.is_excluded(ip) && !pool.is_used(ip)
    })
}

/// Allocate and record a lease for `mac`. A mac that already holds a
/// lease gets its existing address back (stable rebinding).
pub fn lease(pool: &mut DhcpPool, mac: &MacAddress) -> Option<Ipv4Addr> {
    if let Some(existing) = pool.leases.iter().find(|l| &l.mac == mac) {
        return Some(existing.ip);
    }
    let ip = allocate(pool)?;
    pool.used_ips.push(ip);
    let expires_at = Utc::now() + Duration::seconds(i64::from(pool.lease_seconds));
    pool.leases.push(DhcpLease {
        ip,
        mac: mac.clone(),
        expires_at: Some(expires_at),
    });
    Some(ip)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pool_24() -> DhcpPool {
        let mut pool = DhcpPool::new(
            "lan",
            Ipv4Addr::new(192, 168, 10, 0),
            Ipv4Addr::new(255, 255, 255, 0),
        );
        pool.set_gateway(Ipv4Addr::new(192, 168, 10, 1));
        pool
    }

    #[test]
    fn skips_gateway_excluded_and_used() {
        let mut pool = pool_24();
        pool.used_ips.push(Ipv4Addr::new(192, 168, 10, 2));
        pool.used_ips.push(Ipv4Addr::new(192, 168, 10, 3));
        pool.excluded.push(Ipv4Addr::new(192, 168, 10, 4));

        assert_eq!(allocate(&pool), Some(Ipv4Addr::new(192, 168, 10, 5)));
    }

    #[test]
    fn never_returns_network_or_broadcast() {
        let pool = DhcpPool::new(
            "tiny",
            Ipv4Addr::new(10, 0, 0, 0),
            Ipv4Addr::new(255, 255, 255, 252),
        );
        // /30 usable range is .1 and .2 only.
        assert_eq!(allocate(&pool), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn none_when_usable_range_exhausted() {
        let mut pool = DhcpPool::new(
            "tiny",
            Ipv4Addr::new(10, 0, 0, 0),
            Ipv4Addr::new(255, 255, 255, 252),
        );
        pool.set_gateway(Ipv4Addr::new(10, 0, 0, 1));
        pool.excluded.push(Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(allocate(&pool), None);
    }

    #[test]
    fn upper_bound_follows_the_mask() {
        // /22 pool: addresses beyond .255 of the first /24 are usable.
        let mut pool = DhcpPool::new(
            "wide",
            Ipv4Addr::new(172, 16, 0, 0),
            Ipv4Addr::new(255, 255, 252, 0),
        );
        for i in 1..=255 {
            pool.used_ips.push(Ipv4Addr::new(172, 16, 0, i));
        }
        assert_eq!(allocate(&pool), Some(Ipv4Addr::new(172, 16, 1, 0)));
    }

    #[test]
    fn no_host_range_on_slash_31() {
        let pool = DhcpPool::new(
            "p2p",
            Ipv4Addr::new(10, 0, 0, 0),
            Ipv4Addr::new(255, 255, 255, 254),
        );
        assert_eq!(allocate(&pool), None);
    }

    #[test]
    fn lease_is_stable_per_mac() {
        let mut pool = pool_24();
        let mac = MacAddress::new("aa:bb:cc:00:00:01");
        let first = lease(&mut pool, &mac).unwrap();
        let second = lease(&mut pool, &mac).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.leases.len(), 1);
        assert!(pool.is_used(first));
    }
}
