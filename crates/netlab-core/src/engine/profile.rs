// ── Vendor profiles / dialect strategy ──
//
// A profile resolves which CLI dialect applies to a device and owns
// everything dialect-shaped: prompt formatting, context-sensitive help,
// abbreviation expansion, and error phrasing. It never executes
// commands itself.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::model::{CliView, NetworkDevice, Topology, ViewKind};

use super::command::CommandInput;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Huawei,
    Cisco,
}

/// A resolved dialect profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorProfile {
    pub id: &'static str,
    pub label: &'static str,
    pub vendor: Vendor,
}

pub const HUAWEI: VendorProfile = VendorProfile {
    id: "huawei-vrp",
    label: "Huawei VRP",
    vendor: Vendor::Huawei,
};

pub const CISCO: VendorProfile = VendorProfile {
    id: "cisco-ios",
    label: "Cisco IOS",
    vendor: Vendor::Cisco,
};

impl VendorProfile {
    pub fn for_vendor(vendor: Vendor) -> &'static VendorProfile {
        match vendor {
            Vendor::Huawei => &HUAWEI,
            Vendor::Cisco => &CISCO,
        }
    }

    /// Resolve the active profile: explicit override first, else the
    /// device's vendor string, else a model-substring marker. Anything
    /// unmatched defaults to the Huawei baseline dialect.
    pub fn resolve(explicit: Option<Vendor>, device: &NetworkDevice) -> &'static VendorProfile {
        let vendor = explicit
            .or_else(|| infer(&device.vendor, &device.model))
            .unwrap_or(Vendor::Huawei);
        Self::for_vendor(vendor)
    }

    // ── Prompt formatting ───────────────────────────────────────────

    pub fn prompt(&self, device: &NetworkDevice) -> String {
        let host = &device.hostname;
        match self.vendor {
            Vendor::Huawei => match &device.cli.view {
                CliView::UserView => format!("<{host}>"),
                CliView::SystemView => format!("[{host}]"),
                CliView::InterfaceView { port } => format!("[{host}-{port}]"),
                CliView::AclView { acl_id } => {
                    let family = if *acl_id < 3000 { "basic" } else { "adv" };
                    format!("[{host}-acl-{family}-{acl_id}]")
                }
                CliView::BgpView { .. } => format!("[{host}-bgp]"),
                CliView::PoolView { pool } => format!("[{host}-ip-pool-{pool}]"),
            },
            Vendor::Cisco => match &device.cli.view {
                CliView::UserView => {
                    if device.cli.privileged {
                        format!("{host}#")
                    } else {
                        format!("{host}>")
                    }
                }
                CliView::SystemView => format!("{host}(config)#"),
                CliView::InterfaceView { .. } => format!("{host}(config-if)#"),
                CliView::AclView { .. } => format!("{host}(config-ext-nacl)#"),
                CliView::BgpView { .. } => format!("{host}(config-router)#"),
                CliView::PoolView { .. } => format!("{host}(dhcp-config)#"),
            },
        }
    }

    // ── Normalization / abbreviation expansion ──────────────────────

    /// Normalize one raw line into a [`CommandInput`]: trim, collapse
    /// whitespace, lowercase, and expand dialect abbreviations to their
    /// canonical keywords before matching.
    pub fn normalize<'t>(&self, raw: &str, topology: &'t Topology) -> CommandInput<'t> {
        let raw_split: Vec<&str> = raw.split_whitespace().collect();
        let mut tokens = Vec::with_capacity(raw_split.len());
        let mut raw_tokens = Vec::with_capacity(raw_split.len());
        for piece in &raw_split {
            let lowered = piece.to_ascii_lowercase();
            let prev = tokens.last().map(String::as_str);
            match self.expand(prev, &lowered) {
                Some(canonical) => {
                    tokens.push(canonical.to_owned());
                    raw_tokens.push(canonical.to_owned());
                }
                None => {
                    tokens.push(lowered);
                    raw_tokens.push((*piece).to_owned());
                }
            }
        }
        CommandInput {
            line: tokens.join(" "),
            tokens,
            raw_tokens,
            vendor: self.vendor,
            topology,
        }
    }

    /// Canonical keyword for a dialect short form, if any. `prev` is
    /// the already-expanded previous token, for context-dependent
    /// abbreviations.
    fn expand(&self, prev: Option<&str>, token: &str) -> Option<&'static str> {
        match self.vendor {
            Vendor::Huawei => match token {
                "sys" => Some("system-view"),
                "dis" | "disp" => Some("display"),
                "int" => Some("interface"),
                "tracert" => Some("tracert"),
                _ => None,
            },
            Vendor::Cisco => match token {
                "sh" | "sho" | "show" => Some("display"),
                "conf" => Some("configure"),
                "t" | "term" if prev == Some("configure") => Some("terminal"),
                "int" => Some("interface"),
                "en" => Some("enable"),
                "shut" => Some("shutdown"),
                "traceroute" | "tr" => Some("tracert"),
                _ => None,
            },
        }
    }

    // ── Error phrasing ──────────────────────────────────────────────

    pub fn unknown_command(&self) -> &'static str {
        match self.vendor {
            Vendor::Huawei => "Error: Unrecognized command found at '^' position.",
            Vendor::Cisco => "% Invalid input detected at '^' marker.",
        }
    }

    pub fn render_error(&self, err: &CommandError) -> String {
        match self.vendor {
            Vendor::Huawei => match err {
                CommandError::UnknownCommand { .. } => self.unknown_command().to_owned(),
                CommandError::WrongView { required, .. } => {
                    format!("Error: Please switch to {required} first.")
                }
                CommandError::MissingArgument { .. } => {
                    "Error: Incomplete command found at '^' position.".to_owned()
                }
                CommandError::InvalidArgument { value, .. } => {
                    format!("Error: Wrong parameter found at '{value}' position.")
                }
                CommandError::NotFound { what, identifier } => {
                    format!("Error: The {what} {identifier} does not exist.")
                }
                CommandError::Precondition { message } => format!("Error: {message}"),
            },
            Vendor::Cisco => match err {
                CommandError::UnknownCommand { .. } => self.unknown_command().to_owned(),
                CommandError::WrongView { required, .. } => {
                    format!("% Command available only in {required}.")
                }
                CommandError::MissingArgument { .. } => "% Incomplete command.".to_owned(),
                CommandError::InvalidArgument { value, .. } => {
                    format!("% Invalid input detected at '{value}'.")
                }
                CommandError::NotFound { what, identifier } => {
                    format!("% {what} {identifier} not found")
                }
                CommandError::Precondition { message } => format!("% {message}"),
            },
        }
    }

    // ── Context-sensitive help ──────────────────────────────────────

    /// Help lines for the current view, dialect-phrased.
    pub fn help_lines(&self, view: ViewKind) -> Vec<String> {
        let commands: &[&str] = match (self.vendor, view) {
            (Vendor::Huawei, ViewKind::UserView) => {
                &["display", "ping", "tracert", "system-view", "quit"]
            }
            (Vendor::Huawei, ViewKind::SystemView) => &[
                "acl", "bgp", "display", "interface", "ip pool", "sysname", "undo", "vlan", "quit",
            ],
            (Vendor::Huawei, ViewKind::InterfaceView) => &[
                "display", "ip address", "port", "qos", "shutdown", "undo shutdown", "quit",
            ],
            (Vendor::Huawei, ViewKind::AclView) => &["display", "rule", "undo rule", "quit"],
            (Vendor::Huawei, ViewKind::BgpView) => {
                &["display", "network", "peer", "router-id", "quit"]
            }
            (Vendor::Huawei, ViewKind::PoolView) => &[
                "display", "dns-list", "excluded-ip-address", "gateway-list", "lease", "network",
                "static-bind", "quit",
            ],
            (Vendor::Cisco, ViewKind::UserView) => {
                &["enable", "configure terminal", "ping", "show", "traceroute", "exit"]
            }
            (Vendor::Cisco, ViewKind::SystemView) => &[
                "acl", "hostname", "interface", "ip dhcp pool", "no", "router bgp", "show", "vlan",
                "exit",
            ],
            (Vendor::Cisco, ViewKind::InterfaceView) => &[
                "ip address", "no shutdown", "show", "shutdown", "switchport", "exit",
            ],
            (Vendor::Cisco, ViewKind::AclView) => &["rule", "show", "exit"],
            (Vendor::Cisco, ViewKind::BgpView) => &["neighbor", "network", "router-id", "exit"],
            (Vendor::Cisco, ViewKind::PoolView) => &[
                "default-router", "dns-server", "lease", "network", "show", "exit",
            ],
        };
        let mut lines = vec![format!("{} commands available in {view}:", self.label)];
        lines.extend(commands.iter().map(|c| format!("  {c}")));
        lines
    }
}

fn infer(vendor: &str, model: &str) -> Option<Vendor> {
    let vendor = vendor.to_ascii_lowercase();
    let model = model.to_ascii_lowercase();
    if vendor.contains("cisco")
        || model.contains("cisco")
        || model.contains("catalyst")
        || model.starts_with("c29")
        || model.starts_with("isr")
    {
        Some(Vendor::Cisco)
    } else if vendor.contains("huawei")
        || model.contains("huawei")
        || model.starts_with("ar")
        || model.starts_with("s57")
    {
        Some(Vendor::Huawei)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn huawei_device() -> NetworkDevice {
        NetworkDevice::new("r1", "R1", "huawei", "00:00:00:00:00:01")
    }

    #[test]
    fn resolution_prefers_explicit_override() {
        let dev = huawei_device();
        let p = VendorProfile::resolve(Some(Vendor::Cisco), &dev);
        assert_eq!(p.vendor, Vendor::Cisco);
    }

    #[test]
    fn model_marker_selects_cisco() {
        let dev = NetworkDevice::new("s1", "S1", "generic", "00:00:00:00:00:02")
            .with_model("Catalyst 2960");
        assert_eq!(VendorProfile::resolve(None, &dev).vendor, Vendor::Cisco);
    }

    #[test]
    fn unmatched_vendor_defaults_to_huawei_baseline() {
        let dev = NetworkDevice::new("x1", "X1", "acme", "00:00:00:00:00:03");
        assert_eq!(VendorProfile::resolve(None, &dev).vendor, Vendor::Huawei);
    }

    #[test]
    fn huawei_prompts_follow_the_view() {
        let mut dev = huawei_device();
        assert_eq!(HUAWEI.prompt(&dev), "<R1>");
        dev.cli.enter(CliView::SystemView);
        assert_eq!(HUAWEI.prompt(&dev), "[R1]");
        dev.cli.enter(CliView::InterfaceView {
            port: "GigabitEthernet0/0/1".into(),
        });
        assert_eq!(HUAWEI.prompt(&dev), "[R1-GigabitEthernet0/0/1]");
    }

    #[test]
    fn cisco_abbreviations_expand_to_canonical_tokens() {
        let topo = Topology::default();
        let input = CISCO.normalize("sh ip int brief", &topo);
        assert_eq!(input.line, "display ip interface brief");

        let input = CISCO.normalize("conf t", &topo);
        assert_eq!(input.line, "configure terminal");
    }

    #[test]
    fn huawei_abbreviations_expand_to_canonical_tokens() {
        let topo = Topology::default();
        let input = HUAWEI.normalize("  dis   vlan ", &topo);
        assert_eq!(input.line, "display vlan");
        assert_eq!(HUAWEI.normalize("sys", &topo).line, "system-view");
    }

    #[test]
    fn raw_tokens_keep_argument_case() {
        let topo = Topology::default();
        let input = HUAWEI.normalize("sysname Core-SW1", &topo);
        assert_eq!(input.token(1), Some("core-sw1"));
        assert_eq!(input.raw_token(1), Some("Core-SW1"));
    }
}
