// ── Protocol evaluation library ──
//
// Pure functions over the domain model. Commands call into these;
// nothing here knows about command types, views, or vendor dialects.

pub mod acl;
pub mod dhcp;
pub mod ip;
pub mod nat;
pub mod path;
pub mod qos;
pub mod stp;
pub mod vrrp;
