// ── DHCP pool domain types ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::MacAddress;

/// A fixed ip-to-mac reservation inside a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticBinding {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

/// A granted lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpLease {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A leasable address range with exclusions and reservations.
///
/// `used_ips` always contains the gateway plus every leased address;
/// the allocator in `eval::dhcp` treats it as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpPool {
    pub name: String,
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,
    #[serde(default)]
    pub gateway: Option<Ipv4Addr>,
    #[serde(default)]
    pub dns: Vec<Ipv4Addr>,
    #[serde(default)]
    pub excluded: Vec<Ipv4Addr>,
    #[serde(default)]
    pub used_ips: Vec<Ipv4Addr>,
    #[serde(default)]
    pub static_bindings: Vec<StaticBinding>,
    #[serde(default = "default_lease")]
    pub lease_seconds: u32,
    #[serde(default)]
    pub leases: Vec<DhcpLease>,
}

fn default_lease() -> u32 {
    86_400
}

impl DhcpPool {
    pub fn new(name: impl Into<String>, network: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            network,
            mask,
            gateway: None,
            dns: Vec::new(),
            excluded: Vec::new(),
            used_ips: Vec::new(),
            static_bindings: Vec::new(),
            lease_seconds: default_lease(),
            leases: Vec::new(),
        }
    }

    /// Set the gateway, recording it in `used_ips` so the allocator
    /// never hands it out.
    pub fn set_gateway(&mut self, gw: Ipv4Addr) {
        if let Some(old) = self.gateway.take() {
            self.used_ips.retain(|ip| *ip != old);
        }
        self.gateway = Some(gw);
        if !self.used_ips.contains(&gw) {
            self.used_ips.push(gw);
        }
    }

    pub fn is_used(&self, ip: Ipv4Addr) -> bool {
        self.used_ips.contains(&ip)
    }

    pub fn is_excluded(&self, ip: Ipv4Addr) -> bool {
        self.excluded.contains(&ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_gateway_tracks_used_ips() {
        let mut pool = DhcpPool::new(
            "lan",
            Ipv4Addr::new(192, 168, 10, 0),
            Ipv4Addr::new(255, 255, 255, 0),
        );
        pool.set_gateway(Ipv4Addr::new(192, 168, 10, 1));
        assert!(pool.is_used(Ipv4Addr::new(192, 168, 10, 1)));

        // Re-pointing the gateway releases the old address.
        pool.set_gateway(Ipv4Addr::new(192, 168, 10, 254));
        assert!(!pool.is_used(Ipv4Addr::new(192, 168, 10, 1)));
        assert!(pool.is_used(Ipv4Addr::new(192, 168, 10, 254)));
    }
}
