// ── Device identity, CLI state, console log ──
//
// DeviceId and MacAddress are opaque newtypes over the strings the
// external topology editor supplies. CliView is a tagged variant per
// view carrying exactly its own payload, so stale scoped context can
// never leak across a view transition.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

use super::acl::AclRule;
use super::dhcp::DhcpPool;
use super::nat::{NatRule, NatSession};
use super::port::NetworkPort;
use super::routing::{BgpConfig, EthTrunk, LldpNeighbor, OspfLsa, RouteEntry, VrrpGroup};

// ── Identity newtypes ───────────────────────────────────────────────

/// Opaque device identifier assigned by the topology editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// MAC address held in one canonical spelling: lowercase hex pairs
/// joined by colons.
///
/// Topology files and `static-bind` arguments arrive in whatever form
/// the author typed: `AA-BB-CC-DD-EE-FF`, Cisco-style `aabb.ccdd.eeff`,
/// or bare hex. Canonicalizing on construction lets static bindings and
/// lease lookups compare by plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let digits: String = raw.as_ref().chars().filter(char::is_ascii_hexdigit).collect();
        if digits.len() != 12 {
            // Not a recognizable MAC; keep the text as an opaque label.
            return Self(raw.as_ref().to_ascii_lowercase());
        }
        let mut canonical = String::with_capacity(17);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && i % 2 == 0 {
                canonical.push(':');
            }
            canonical.push(c.to_ascii_lowercase());
        }
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ── CLI view state machine ──────────────────────────────────────────

/// The current CLI scope of a device.
///
/// Exactly one view is active per device at any time. Scope-entering
/// commands replace the variant wholesale; `quit` pops toward
/// [`CliView::UserView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(
    name(ViewKind),
    derive(Hash, strum::Display),
    strum(serialize_all = "kebab-case")
)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum CliView {
    UserView,
    SystemView,
    InterfaceView { port: String },
    AclView { acl_id: u32 },
    BgpView { as_number: u32 },
    PoolView { pool: String },
}

impl Default for CliView {
    fn default() -> Self {
        Self::UserView
    }
}

impl CliView {
    pub fn kind(&self) -> ViewKind {
        ViewKind::from(self)
    }
}

/// Per-device CLI session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliState {
    pub view: CliView,
    /// Cisco privileged EXEC flag; affects the prompt only.
    #[serde(default)]
    pub privileged: bool,
}

impl CliState {
    /// Enter a child view, replacing any scoped context of the old one.
    pub fn enter(&mut self, view: CliView) {
        self.view = view;
    }

    /// Pop one level toward the user view. Returns `false` when already
    /// at the top.
    pub fn pop_view(&mut self) -> bool {
        match self.view {
            CliView::UserView => false,
            CliView::SystemView => {
                self.view = CliView::UserView;
                true
            }
            _ => {
                self.view = CliView::SystemView;
                true
            }
        }
    }

    /// Jump straight back to the user view (Cisco `end`).
    pub fn reset(&mut self) {
        self.view = CliView::UserView;
    }
}

// ── Console transcript ──────────────────────────────────────────────

/// One console line with its arrival timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Append-only console transcript with a bounded retention window.
///
/// Alarm/log display commands read from here; the window keeps memory
/// bounded over long sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLog {
    lines: VecDeque<ConsoleLine>,
    capacity: usize,
}

impl ConsoleLog {
    pub const DEFAULT_CAPACITY: usize = 512;

    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(ConsoleLine {
            at: Utc::now(),
            text: text.into(),
        });
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter()
    }

    /// The most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&ConsoleLine> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

// ── The device record ───────────────────────────────────────────────

/// A virtual router, switch, or PC in the sandbox.
///
/// Owned and mutated in place by whichever command executes against it;
/// created and destroyed by the external topology editor. `acl_rules`
/// order is evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDevice {
    pub id: DeviceId,
    pub hostname: String,
    pub vendor: String,
    #[serde(default)]
    pub model: String,
    pub mac: MacAddress,

    #[serde(default)]
    pub ports: Vec<NetworkPort>,
    /// Configured VLAN ids. VLAN 1 is implicit and always present.
    #[serde(default)]
    pub vlans: BTreeSet<u16>,
    #[serde(default)]
    pub dhcp_pools: Vec<DhcpPool>,
    #[serde(default)]
    pub bgp: Option<BgpConfig>,
    #[serde(default)]
    pub ospf_lsdb: Vec<OspfLsa>,
    #[serde(default)]
    pub routing_table: Vec<RouteEntry>,
    #[serde(default)]
    pub acl_rules: Vec<AclRule>,
    #[serde(default)]
    pub eth_trunks: Vec<EthTrunk>,
    #[serde(default)]
    pub lldp_neighbors: Vec<LldpNeighbor>,
    #[serde(default)]
    pub vrrp_groups: Vec<VrrpGroup>,
    #[serde(default)]
    pub nat_rules: Vec<NatRule>,
    #[serde(default)]
    pub nat_sessions: Vec<NatSession>,

    #[serde(default)]
    pub cli: CliState,
    #[serde(default)]
    pub console: ConsoleLog,
}

impl NetworkDevice {
    pub fn new(
        id: impl Into<String>,
        hostname: impl Into<String>,
        vendor: impl Into<String>,
        mac: impl AsRef<str>,
    ) -> Self {
        Self {
            id: DeviceId::new(id),
            hostname: hostname.into(),
            vendor: vendor.into(),
            model: String::new(),
            mac: MacAddress::new(mac),
            ports: Vec::new(),
            vlans: BTreeSet::new(),
            dhcp_pools: Vec::new(),
            bgp: None,
            ospf_lsdb: Vec::new(),
            routing_table: Vec::new(),
            acl_rules: Vec::new(),
            eth_trunks: Vec::new(),
            lldp_neighbors: Vec::new(),
            vrrp_groups: Vec::new(),
            nat_rules: Vec::new(),
            nat_sessions: Vec::new(),
            cli: CliState::default(),
            console: ConsoleLog::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_port(mut self, port: NetworkPort) -> Self {
        self.ports.push(port);
        self
    }

    /// VLAN 1 exists implicitly on every device.
    pub fn has_vlan(&self, vlan: u16) -> bool {
        vlan == 1 || self.vlans.contains(&vlan)
    }

    /// Resolve a port by id or name, case-insensitively.
    pub fn port(&self, ident: &str) -> Option<&NetworkPort> {
        self.ports
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(ident) || p.name.eq_ignore_ascii_case(ident))
    }

    pub fn port_mut(&mut self, ident: &str) -> Option<&mut NetworkPort> {
        self.ports
            .iter_mut()
            .find(|p| p.id.eq_ignore_ascii_case(ident) || p.name.eq_ignore_ascii_case(ident))
    }

    pub fn pool(&self, name: &str) -> Option<&DhcpPool> {
        self.dhcp_pools.iter().find(|p| p.name == name)
    }

    pub fn pool_mut(&mut self, name: &str) -> Option<&mut DhcpPool> {
        self.dhcp_pools.iter_mut().find(|p| p.name == name)
    }
}
