// ── Port domain types ──

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Physical port kind -- affects naming and defaults only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortKind {
    Ethernet,
    GigabitEthernet,
    Serial,
    Loopback,
}

/// Link mode of a switched or routed port.
///
/// Access carries one untagged VLAN, trunk a set of tagged VLANs,
/// hybrid mixes both, routed has no VLAN membership at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMode {
    Access,
    Trunk,
    Hybrid,
    Routed,
}

/// Per-port QoS settings plus the per-flow usage counter the QoS
/// tracer bumps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosConfig {
    /// Explicit DSCP -> queue overrides; unmapped DSCPs fall back to dscp/8.
    #[serde(default)]
    pub dscp_queue_map: BTreeMap<u8, u8>,
    /// Scheduling weight per queue; unset queues use a weight of 10.
    #[serde(default)]
    pub queue_weights: BTreeMap<u8, u32>,
    /// Optional traffic-shaping percentage (0-100).
    #[serde(default)]
    pub shaping_percent: Option<u8>,
    /// Flows evaluated through this port, bumped by the QoS tracer.
    #[serde(default)]
    pub flows_evaluated: u64,
}

/// Everything configurable on a port through the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    pub mode: LinkMode,
    /// Untagged VLAN in access mode. Must reference a VLAN present on
    /// the owning device.
    #[serde(default = "default_vlan")]
    pub access_vlan: u16,
    /// Tagged VLANs allowed in trunk/hybrid mode. Same reference
    /// invariant as `access_vlan`.
    #[serde(default)]
    pub allowed_vlans: BTreeSet<u16>,
    #[serde(default)]
    pub ip: Option<Ipv4Addr>,
    #[serde(default)]
    pub mask: Option<Ipv4Addr>,
    #[serde(default)]
    pub qos: QosConfig,
    #[serde(default)]
    pub bpdu_guard: bool,
    #[serde(default)]
    pub root_protection: bool,
    #[serde(default)]
    pub edge_port: bool,
    #[serde(default)]
    pub helper_addresses: Vec<Ipv4Addr>,
}

fn default_vlan() -> u16 {
    1
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            mode: LinkMode::Access,
            access_vlan: 1,
            allowed_vlans: BTreeSet::new(),
            ip: None,
            mask: None,
            qos: QosConfig::default(),
            bpdu_guard: false,
            root_protection: false,
            edge_port: false,
            helper_addresses: Vec::new(),
        }
    }
}

// ── STP (presentation-only state) ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StpRole {
    Designated,
    Root,
    Alternate,
    Backup,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StpStatus {
    Forwarding,
    Learning,
    Discarding,
    Disabled,
}

/// STP role/status/counters as populated by the out-of-scope topology
/// simulation. The engine only formats these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StpPortState {
    pub role: StpRole,
    pub status: StpStatus,
    #[serde(default)]
    pub tx_bpdu: u64,
    #[serde(default)]
    pub rx_bpdu: u64,
}

impl Default for StpPortState {
    fn default() -> Self {
        Self {
            role: StpRole::Designated,
            status: StpStatus::Forwarding,
            tx_bpdu: 0,
            rx_bpdu: 0,
        }
    }
}

// ── The port record ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPort {
    /// Canonical id, e.g. `GigabitEthernet0/0/1`.
    pub id: String,
    /// Short display name, e.g. `GE0/0/1`.
    pub name: String,
    pub kind: PortKind,
    #[serde(default = "default_true")]
    pub admin_up: bool,
    #[serde(default)]
    pub link_up: bool,
    #[serde(default)]
    pub config: PortConfig,
    #[serde(default)]
    pub stp: StpPortState,
}

fn default_true() -> bool {
    true
}

impl NetworkPort {
    pub fn gigabit(index: impl AsRef<str>) -> Self {
        let index = index.as_ref();
        Self {
            id: format!("GigabitEthernet{index}"),
            name: format!("GE{index}"),
            kind: PortKind::GigabitEthernet,
            admin_up: true,
            link_up: false,
            config: PortConfig::default(),
            stp: StpPortState::default(),
        }
    }

    pub fn with_ip(mut self, ip: Ipv4Addr, mask: Ipv4Addr) -> Self {
        self.config.ip = Some(ip);
        self.config.mask = Some(mask);
        self.config.mode = LinkMode::Routed;
        self
    }

    pub fn with_access_vlan(mut self, vlan: u16) -> Self {
        self.config.mode = LinkMode::Access;
        self.config.access_vlan = vlan;
        self
    }

    pub fn with_trunk(mut self, vlans: impl IntoIterator<Item = u16>) -> Self {
        self.config.mode = LinkMode::Trunk;
        self.config.allowed_vlans = vlans.into_iter().collect();
        self
    }

    /// VLAN gating used by the path finder: access ports carry exactly
    /// their untagged VLAN, trunk/hybrid ports their allowed set, and
    /// routed ports bypass VLAN gating entirely.
    pub fn permits_vlan(&self, vlan: u16) -> bool {
        match self.config.mode {
            LinkMode::Routed => true,
            LinkMode::Access => self.config.access_vlan == vlan,
            LinkMode::Trunk | LinkMode::Hybrid => self.config.allowed_vlans.contains(&vlan),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routed_ports_bypass_vlan_gating() {
        let port = NetworkPort::gigabit("0/0/1").with_ip(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(255, 255, 255, 0),
        );
        assert!(port.permits_vlan(10));
        assert!(port.permits_vlan(999));
    }

    #[test]
    fn access_port_carries_only_its_vlan() {
        let port = NetworkPort::gigabit("0/0/2").with_access_vlan(10);
        assert!(port.permits_vlan(10));
        assert!(!port.permits_vlan(20));
    }

    #[test]
    fn trunk_port_uses_allowed_set() {
        let port = NetworkPort::gigabit("0/0/3").with_trunk([10, 20]);
        assert!(port.permits_vlan(20));
        assert!(!port.permits_vlan(30));
    }
}
