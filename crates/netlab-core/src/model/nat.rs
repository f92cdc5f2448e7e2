// ── NAT domain types ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::eval::ip::{Cidr, Protocol};

/// An outbound source-NAT rule. Rules are stored in match order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatRule {
    pub id: u32,
    /// Egress interface scope; `None` matches any interface.
    #[serde(default)]
    pub interface: Option<String>,
    /// Source range the rule translates.
    pub source: Cidr,
    /// Public address the source is rewritten to.
    pub translated: Ipv4Addr,
}

/// An active translation, keyed by `(protocol, original endpoint)` and
/// stable for the flow's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatSession {
    pub protocol: Protocol,
    pub inside_ip: Ipv4Addr,
    pub inside_port: u16,
    pub outside_ip: Ipv4Addr,
    pub outside_port: u16,
    pub created_at: DateTime<Utc>,
}

impl NatSession {
    pub fn key_matches(&self, protocol: Protocol, ip: Ipv4Addr, port: u16) -> bool {
        self.protocol == protocol && self.inside_ip == ip && self.inside_port == port
    }
}
