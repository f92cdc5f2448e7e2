// ── Domain model ──
//
// Plain data records for devices, ports, cables, pools, and rules.
// No behavior beyond small accessors: the evaluation library and the
// command vocabulary consume these, the external topology editor
// creates and destroys them, and the persistence layer round-trips
// them through serde as opaque state.

mod acl;
mod device;
mod dhcp;
mod nat;
mod port;
mod routing;
mod topology;

pub use acl::{AclAction, AclRule, Direction};
pub use device::{
    CliState, CliView, ConsoleLine, ConsoleLog, DeviceId, MacAddress, NetworkDevice, ViewKind,
};
pub use dhcp::{DhcpLease, DhcpPool, StaticBinding};
pub use nat::{NatRule, NatSession};
pub use port::{LinkMode, NetworkPort, PortConfig, PortKind, QosConfig, StpPortState, StpRole,
    StpStatus};
pub use routing::{
    BgpConfig, BgpNeighbor, BgpPeerState, EthTrunk, LldpNeighbor, OspfLsa, RouteEntry,
    RouteProtocol, VrrpGroup,
};
pub use topology::{Cable, Endpoint, Topology};
