// ── Routing / control-plane configuration records ──
//
// OSPF, BGP, RIP state here is configuration data plus static lookup
// tables rendered by display commands -- there is no live message
// exchange or timed convergence in the engine.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::eval::ip::Cidr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteProtocol {
    Direct,
    Static,
    Ospf,
    Bgp,
    Rip,
}

impl RouteProtocol {
    /// Label used in the routing-table display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Static => "Static",
            Self::Ospf => "OSPF",
            Self::Bgp => "BGP",
            Self::Rip => "RIP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub destination: Cidr,
    pub protocol: RouteProtocol,
    pub preference: u8,
    pub cost: u32,
    pub next_hop: Ipv4Addr,
    pub interface: String,
}

/// One entry of the (statically populated) OSPF link-state database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfLsa {
    pub lsa_type: String,
    pub link_state_id: Ipv4Addr,
    pub advertising_router: Ipv4Addr,
    pub age: u32,
    pub sequence: u32,
}

// ── BGP ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgpPeerState {
    Idle,
    Established,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighbor {
    pub address: Ipv4Addr,
    pub remote_as: u32,
    pub state: BgpPeerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpConfig {
    pub as_number: u32,
    #[serde(default)]
    pub router_id: Option<Ipv4Addr>,
    #[serde(default)]
    pub neighbors: Vec<BgpNeighbor>,
    #[serde(default)]
    pub networks: Vec<Cidr>,
    #[serde(default = "default_local_pref")]
    pub default_local_preference: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_local_pref() -> u32 {
    100
}

fn default_enabled() -> bool {
    true
}

impl BgpConfig {
    pub fn new(as_number: u32) -> Self {
        Self {
            as_number,
            router_id: None,
            neighbors: Vec::new(),
            networks: Vec::new(),
            default_local_preference: default_local_pref(),
            enabled: true,
        }
    }
}

// ── Link aggregation / discovery / redundancy records ───────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthTrunk {
    pub id: u8,
    pub member_ports: Vec<String>,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpNeighbor {
    pub local_port: String,
    pub remote_device: String,
    pub remote_port: String,
}

/// Per-interface VRRP group membership; the elector in `eval::vrrp`
/// decides mastership across devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrrpGroup {
    pub vrid: u8,
    pub interface: String,
    pub virtual_ip: Ipv4Addr,
    pub priority: u8,
}
