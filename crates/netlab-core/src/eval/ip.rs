// ── IP / CIDR utilities ──
//
// Address-to-integer conversion, prefix masking, and the small match
// primitives (protocol names, port specs) the ACL and NAT evaluators
// build on.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub fn to_u32(ip: Ipv4Addr) -> u32 {
    u32::from_be_bytes(ip.octets())
}

pub fn from_u32(raw: u32) -> Ipv4Addr {
    Ipv4Addr::from(raw.to_be_bytes())
}

/// Dotted-decimal mask for a prefix length (`24` -> `255.255.255.0`).
pub fn mask_from_prefix(prefix: u8) -> Ipv4Addr {
    if prefix == 0 {
        return Ipv4Addr::new(0, 0, 0, 0);
    }
    let prefix = prefix.min(32);
    from_u32(u32::MAX << (32 - u32::from(prefix)))
}

/// Prefix length of a dotted-decimal mask; `None` if the mask is not
/// contiguous.
pub fn prefix_from_mask(mask: Ipv4Addr) -> Option<u8> {
    let raw = to_u32(mask);
    #[allow(clippy::cast_possible_truncation)]
    let ones = raw.count_ones() as u8;
    (to_u32(mask_from_prefix(ones)) == raw).then_some(ones)
}

// ── CIDR ────────────────────────────────────────────────────────────

/// Address plus prefix length denoting a contiguous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cidr {
    pub addr: Ipv4Addr,
    pub prefix: u8,
}

impl Cidr {
    pub const ANY: Cidr = Cidr {
        addr: Ipv4Addr::new(0, 0, 0, 0),
        prefix: 0,
    };

    pub fn new(addr: Ipv4Addr, prefix: u8) -> Self {
        Self {
            addr,
            prefix: prefix.min(32),
        }
    }

    pub fn from_addr_mask(addr: Ipv4Addr, mask: Ipv4Addr) -> Option<Self> {
        Some(Self::new(addr, prefix_from_mask(mask)?))
    }

    pub fn host(addr: Ipv4Addr) -> Self {
        Self::new(addr, 32)
    }

    pub fn network(&self) -> Ipv4Addr {
        from_u32(to_u32(self.addr) & to_u32(mask_from_prefix(self.prefix)))
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        from_u32(to_u32(self.network()) | !to_u32(mask_from_prefix(self.prefix)))
    }

    /// Standard prefix-masking membership test.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        if self.prefix == 0 {
            return true;
        }
        let shift = 32 - u32::from(self.prefix);
        (to_u32(ip) >> shift) == (to_u32(self.addr) >> shift)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = String;

    /// Parses `a.b.c.d/n`, a bare address (treated as /32), or `any`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("any") {
            return Ok(Self::ANY);
        }
        match s.split_once('/') {
            Some((addr, prefix)) => {
                let addr: Ipv4Addr = addr.parse().map_err(|_| format!("bad address: {s}"))?;
                let prefix: u8 = prefix.parse().map_err(|_| format!("bad prefix: {s}"))?;
                if prefix > 32 {
                    return Err(format!("bad prefix: {s}"));
                }
                Ok(Self::new(addr, prefix))
            }
            None => {
                let addr: Ipv4Addr = s.parse().map_err(|_| format!("bad address: {s}"))?;
                Ok(Self::host(addr))
            }
        }
    }
}

// ── Protocol ────────────────────────────────────────────────────────

/// L3/L4 protocol selector for rules and packet descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Any,
    Ip,
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    /// Rule-side matching: `any` and `ip` match every packet protocol.
    pub fn matches(&self, packet: Protocol) -> bool {
        matches!(self, Self::Any | Self::Ip) || *self == packet
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Any => "any",
            Self::Ip => "ip",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "ip" => Ok(Self::Ip),
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "icmp" => Ok(Self::Icmp),
            other => Err(format!("unknown protocol: {other}")),
        }
    }
}

// ── Port matching ───────────────────────────────────────────────────

/// Port spec on a rule: wildcard, exact value, or inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMatch {
    Any,
    Eq(u16),
    Range(u16, u16),
}

impl Default for PortMatch {
    fn default() -> Self {
        Self::Any
    }
}

impl PortMatch {
    pub fn matches(&self, port: u16) -> bool {
        match *self {
            Self::Any => true,
            Self::Eq(p) => p == port,
            Self::Range(lo, hi) => (lo..=hi).contains(&port),
        }
    }
}

impl fmt::Display for PortMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Any => write!(f, "any"),
            Self::Eq(p) => write!(f, "eq {p}"),
            Self::Range(lo, hi) => write!(f, "range {lo} {hi}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mask_prefix_round_trip() {
        assert_eq!(mask_from_prefix(24), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(prefix_from_mask(Ipv4Addr::new(255, 255, 255, 0)), Some(24));
        assert_eq!(prefix_from_mask(Ipv4Addr::new(255, 255, 252, 0)), Some(22));
        assert_eq!(prefix_from_mask(Ipv4Addr::new(255, 0, 255, 0)), None);
    }

    #[test]
    fn cidr_membership() {
        let net: Cidr = "192.168.10.0/24".parse().unwrap();
        assert!(net.contains(Ipv4Addr::new(192, 168, 10, 77)));
        assert!(!net.contains(Ipv4Addr::new(192, 168, 11, 1)));
        assert!(Cidr::ANY.contains(Ipv4Addr::new(8, 8, 8, 8)));
    }

    #[test]
    fn cidr_parses_bare_address_as_host() {
        let host: Cidr = "10.0.0.5".parse().unwrap();
        assert_eq!(host.prefix, 32);
        assert!(host.contains(Ipv4Addr::new(10, 0, 0, 5)));
        assert!(!host.contains(Ipv4Addr::new(10, 0, 0, 6)));
    }

    #[test]
    fn cidr_network_and_broadcast() {
        let net: Cidr = "192.168.10.13/24".parse().unwrap();
        assert_eq!(net.network(), Ipv4Addr::new(192, 168, 10, 0));
        assert_eq!(net.broadcast(), Ipv4Addr::new(192, 168, 10, 255));
    }

    #[test]
    fn protocol_ip_matches_everything() {
        assert!(Protocol::Ip.matches(Protocol::Tcp));
        assert!(Protocol::Any.matches(Protocol::Icmp));
        assert!(!Protocol::Tcp.matches(Protocol::Udp));
    }

    #[test]
    fn port_match_variants() {
        assert!(PortMatch::Any.matches(80));
        assert!(PortMatch::Eq(80).matches(80));
        assert!(!PortMatch::Eq(80).matches(81));
        assert!(PortMatch::Range(20, 21).matches(21));
        assert!(!PortMatch::Range(20, 21).matches(22));
    }
}
