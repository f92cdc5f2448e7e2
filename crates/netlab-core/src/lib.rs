//! Command dispatch engine and protocol evaluation library for the
//! netlab network-training sandbox.
//!
//! This crate owns the device domain model and everything that happens
//! between a raw CLI line and the resulting device state:
//!
//! - **[`CommandExecutor`]** — Single dispatch entry point:
//!   [`dispatch()`](engine::CommandExecutor::dispatch) resolves the
//!   vendor dialect, normalizes the line, looks the command up in the
//!   injected [`CommandRegistry`], validates, executes, and appends the
//!   transcript to the device console.
//!
//! - **Command vocabulary** ([`commands`]) — Descriptor records for the
//!   Huawei-baseline CLI with Cisco dialect forms: view navigation,
//!   VLAN/interface/ACL/BGP/DHCP-pool configuration, the `display`
//!   family, and `ping`/`tracert` diagnostics.
//!
//! - **Evaluation library** ([`eval`]) — Deterministic, mostly pure
//!   protocol helpers: ACL first-match evaluation, DHCP allocation,
//!   VRRP election, BFS path finding with VLAN gating, QoS delay
//!   tracing, NAT session translation, and STP table formatting.
//!
//! - **Domain model** ([`model`]) — Plain serde-backed records for
//!   devices, ports, cables, pools, and rules, plus the per-device
//!   CLI view state machine and bounded console log.

pub mod commands;
pub mod engine;
pub mod error;
pub mod eval;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use engine::{
    CommandExecutor, CommandRegistry, Dispatch, UsageRecord, Vendor, VendorProfile,
};
pub use error::CommandError;
pub use model::{
    CliState, CliView, DeviceId, MacAddress, NetworkDevice, Topology, ViewKind,
};
