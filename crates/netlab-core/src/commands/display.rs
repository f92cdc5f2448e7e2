// ── The display command family ──
//
// Read-only renderers over device and topology state. Cisco `show` is
// canonicalized to `display` during normalization, so one descriptor
// set serves both dialects. Header strings and column paddings are part
// of the output contract and pinned by tests.

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::profile::Vendor;
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::eval::ip::PortMatch;
use crate::eval::{nat, stp, vrrp};
use crate::model::{
    AclAction, AclRule, BgpPeerState, CliView, LinkMode, NetworkDevice, Topology, VrrpGroup,
};

use super::util;

// ── display vlan ────────────────────────────────────────────────────

fn m_vlan(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "vlan"])
}

fn x_vlan(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let mut ids: Vec<u16> = vec![1];
    ids.extend(device.vlans.iter().copied().filter(|v| *v != 1));
    let mut lines = vec![
        format!("The total number of vlans is : {}", ids.len()),
        "VLAN ID  Type      Ports".to_owned(),
    ];
    for vlan in ids {
        let members: Vec<&str> = device
            .ports
            .iter()
            .filter(|p| match p.config.mode {
                LinkMode::Access => p.config.access_vlan == vlan,
                LinkMode::Trunk | LinkMode::Hybrid => p.config.allowed_vlans.contains(&vlan),
                LinkMode::Routed => false,
            })
            .map(|p| p.name.as_str())
            .collect();
        lines.push(format!("{:<7}  common    {}", vlan, members.join(" ")));
    }
    Ok(lines)
}

// ── display ip interface brief ──────────────────────────────────────

fn m_ip_interface(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "ip", "interface"])
}

fn x_ip_interface(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let mut lines = vec![
        "Interface                         IP Address/Mask      Physical  Protocol".to_owned(),
    ];
    for port in &device.ports {
        let addr = match (port.config.ip, port.config.mask) {
            (Some(ip), Some(mask)) => match crate::eval::ip::prefix_from_mask(mask) {
                Some(prefix) => format!("{ip}/{prefix}"),
                None => ip.to_string(),
            },
            _ => "unassigned".to_owned(),
        };
        let physical = if !port.admin_up {
            "*down"
        } else if port.link_up {
            "up"
        } else {
            "down"
        };
        let protocol = if port.admin_up && port.link_up { "up" } else { "down" };
        lines.push(format!(
            "{:<33} {:<20} {:<9} {}",
            port.id, addr, physical, protocol
        ));
    }
    Ok(lines)
}

// ── display ip routing-table / show ip route ────────────────────────

fn m_routing_table(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "ip", "routing-table"])
        || ctx.input.starts_with(&["display", "ip", "route"])
}

fn x_routing_table(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let mut lines = vec![
        format!("Routing Tables: Public, {} routes", device.routing_table.len()),
        "Destination/Mask     Proto   Pre  Cost  NextHop          Interface".to_owned(),
    ];
    for route in &device.routing_table {
        lines.push(format!(
            "{:<20} {:<7} {:<4} {:<5} {:<16} {}",
            route.destination.to_string(),
            route.protocol.label(),
            route.preference,
            route.cost,
            route.next_hop.to_string(),
            route.interface
        ));
    }
    Ok(lines)
}

// ── display acl all ─────────────────────────────────────────────────

fn m_acl(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "acl"])
}

fn rule_line(rule: &AclRule) -> String {
    let action = match rule.action {
        AclAction::Permit => "permit",
        AclAction::Deny => "deny",
    };
    let mut line = format!(
        " rule {} {} {} source {} destination {}",
        rule.rule_id, action, rule.protocol, rule.src, rule.dst
    );
    if rule.src_port != PortMatch::Any {
        line.push_str(&format!(" source-port {}", rule.src_port));
    }
    if rule.dst_port != PortMatch::Any {
        line.push_str(&format!(" destination-port {}", rule.dst_port));
    }
    if rule.hits > 0 {
        line.push_str(&format!(" ({} matches)", rule.hits));
    }
    line
}

fn x_acl(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    if device.acl_rules.is_empty() {
        return Ok(vec!["No ACL configured.".to_owned()]);
    }
    let groups: indexmap::IndexSet<u32> = device.acl_rules.iter().map(|r| r.acl_id).collect();
    let mut lines = Vec::new();
    for acl_id in groups {
        let rules: Vec<&AclRule> = device
            .acl_rules
            .iter()
            .filter(|r| r.acl_id == acl_id)
            .collect();
        let family = if acl_id < 3000 { "Basic" } else { "Advanced" };
        lines.push(format!("{} ACL {}, {} rules", family, acl_id, rules.len()));
        lines.extend(rules.iter().map(|r| rule_line(r)));
    }
    Ok(lines)
}

// ── display bgp peer ────────────────────────────────────────────────

fn m_bgp_peer(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "bgp"])
}

fn x_bgp_peer(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let Some(cfg) = &device.bgp else {
        return Ok(vec!["BGP is not running.".to_owned()]);
    };
    let router_id = cfg
        .router_id
        .map_or_else(|| "not configured".to_owned(), |id| id.to_string());
    let mut lines = vec![
        format!("BGP local router ID : {router_id}"),
        format!("Local AS number : {}", cfg.as_number),
        format!("Total number of peers : {}", cfg.neighbors.len()),
        "Peer             AS      State".to_owned(),
    ];
    for peer in &cfg.neighbors {
        let state = match peer.state {
            BgpPeerState::Idle => "Idle",
            BgpPeerState::Established => "Established",
        };
        lines.push(format!(
            "{:<16} {:<7} {}",
            peer.address.to_string(),
            peer.remote_as,
            state
        ));
    }
    Ok(lines)
}

// ── display stp brief ───────────────────────────────────────────────

fn m_stp(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "stp"])
}

fn x_stp(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    Ok(stp::format_brief(device))
}

// ── display vrrp ────────────────────────────────────────────────────

fn m_vrrp(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "vrrp"])
}

/// Router id used for VRRP tie-breaking, as a string: the BGP router
/// id when set, else the first configured port address, else the
/// device id.
fn election_router_id(device: &NetworkDevice) -> String {
    if let Some(id) = device.bgp.as_ref().and_then(|b| b.router_id) {
        return id.to_string();
    }
    device
        .ports
        .iter()
        .find_map(|p| p.config.ip)
        .map_or_else(|| device.id.to_string(), |ip| ip.to_string())
}

fn candidates_for(topology: &Topology, group: &VrrpGroup) -> Vec<vrrp::Candidate> {
    topology
        .devices
        .iter()
        .filter_map(|dev| {
            dev.vrrp_groups
                .iter()
                .find(|g| g.vrid == group.vrid && g.virtual_ip == group.virtual_ip)
                .map(|g| vrrp::Candidate {
                    device: dev.id.clone(),
                    priority: g.priority,
                    router_id: election_router_id(dev),
                })
        })
        .collect()
}

fn x_vrrp(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    if device.vrrp_groups.is_empty() {
        return Ok(vec!["No VRRP group configured.".to_owned()]);
    }
    let mut lines = vec!["Vrid  Interface                   VirtualIP        Priority  State".to_owned()];
    for group in &device.vrrp_groups {
        let candidates = candidates_for(input.topology, group);
        let state = match vrrp::elect(&candidates) {
            Some(master) if master.device == device.id => "Master",
            Some(_) => "Backup",
            None => "Initialize",
        };
        lines.push(format!(
            "{:<5} {:<27} {:<16} {:<9} {}",
            group.vrid,
            group.interface,
            group.virtual_ip.to_string(),
            group.priority,
            state
        ));
    }
    Ok(lines)
}

// ── display ip pool ─────────────────────────────────────────────────

fn m_ip_pool(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "ip", "pool"])
}

fn v_ip_pool(ctx: &CommandContext) -> Result<(), CommandError> {
    if ctx.input.token(3) == Some("name") {
        let name = util::require_raw(ctx.input, 4, "pool name")?;
        if ctx.device.pool(name).is_none() {
            return Err(CommandError::NotFound {
                what: "pool",
                identifier: name.to_owned(),
            });
        }
    }
    Ok(())
}

fn pool_block(pool: &crate::model::DhcpPool) -> Vec<String> {
    let gateway = pool
        .gateway
        .map_or_else(|| "not configured".to_owned(), |gw| gw.to_string());
    let dns: Vec<String> = pool.dns.iter().map(ToString::to_string).collect();
    vec![
        format!("Pool name      : {}", pool.name),
        format!("Network        : {} mask {}", pool.network, pool.mask),
        format!("Gateway        : {gateway}"),
        format!("DNS            : {}", if dns.is_empty() { "-".to_owned() } else { dns.join(" ") }),
        format!("Excluded       : {} address(es)", pool.excluded.len()),
        format!("Lease          : {} second(s)", pool.lease_seconds),
        format!(
            "Usage          : {} used, {} lease(s), {} static binding(s)",
            pool.used_ips.len(),
            pool.leases.len(),
            pool.static_bindings.len()
        ),
    ]
}

fn x_ip_pool(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    if input.token(3) == Some("name") {
        let name = util::require_raw(input, 4, "pool name")?;
        let pool = device.pool(name).ok_or_else(|| CommandError::NotFound {
            what: "pool",
            identifier: name.to_owned(),
        })?;
        return Ok(pool_block(pool));
    }
    if device.dhcp_pools.is_empty() {
        return Ok(vec!["No IP pool configured.".to_owned()]);
    }
    let mut lines = Vec::new();
    for pool in &device.dhcp_pools {
        lines.extend(pool_block(pool));
    }
    Ok(lines)
}

// ── display nat session ─────────────────────────────────────────────

fn m_nat_session(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "nat", "session"])
}

fn x_nat_session(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let mut lines = vec![format!("Total sessions : {}", device.nat_sessions.len())];
    lines.extend(device.nat_sessions.iter().map(|s| format!("  {}", nat::render(s))));
    Ok(lines)
}

// ── display qos statistics interface <name> ─────────────────────────

fn m_qos(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "qos"])
}

fn v_qos(ctx: &CommandContext) -> Result<(), CommandError> {
    let ident = qos_interface_ident(ctx.input)?;
    if ctx.device.port(&ident).is_none() {
        return Err(CommandError::NotFound {
            what: "interface",
            identifier: ident,
        });
    }
    Ok(())
}

fn qos_interface_ident(input: &CommandInput) -> Result<String, CommandError> {
    // `display qos statistics interface <name>`; tolerate the elided
    // `statistics` keyword.
    let from = if input.token(2) == Some("statistics") { 4 } else { 3 };
    let ident = util::joined_ident(input, from);
    if ident.is_empty() {
        return Err(CommandError::MissingArgument { what: "interface" });
    }
    Ok(ident)
}

fn x_qos(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let ident = qos_interface_ident(input)?;
    let port = device.port(&ident).ok_or(CommandError::NotFound {
        what: "interface",
        identifier: ident,
    })?;
    let qos = &port.config.qos;
    let mut lines = vec![format!("Interface {} QoS statistics:", port.id)];
    for (queue, weight) in &qos.queue_weights {
        lines.push(format!("  queue {queue} weight {weight}"));
    }
    if let Some(pct) = qos.shaping_percent {
        lines.push(format!("  shaping: {pct}%"));
    }
    lines.push(format!("  flows evaluated: {}", qos.flows_evaluated));
    Ok(lines)
}

// ── display logbuffer ───────────────────────────────────────────────

const LOGBUFFER_WINDOW: usize = 100;

fn m_logbuffer(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "logbuffer"])
}

fn x_logbuffer(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let tail = device.console.tail(LOGBUFFER_WINDOW);
    let mut lines = vec![format!(
        "Logging buffer ({} of {} lines):",
        tail.len(),
        device.console.len()
    )];
    lines.extend(tail.iter().map(|l| format!("  {}", l.text)));
    Ok(lines)
}

// ── display version ─────────────────────────────────────────────────

fn m_version(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "version"])
}

fn x_version(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let model = if device.model.is_empty() {
        "generic".to_owned()
    } else {
        device.model.clone()
    };
    Ok(match input.vendor {
        Vendor::Huawei => vec![
            "Huawei Versatile Routing Platform Software".to_owned(),
            format!("VRP (R) software, Version 5.170 ({model})"),
            format!("{} uptime is 0 week, 0 day", device.hostname),
        ],
        Vendor::Cisco => vec![
            format!("Cisco IOS Software, {model} Software, Version 15.2"),
            format!("{} uptime is 0 minutes", device.hostname),
        ],
    })
}

// ── display this ────────────────────────────────────────────────────

fn m_this(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["display", "this"])
}

/// Running configuration scoped to the active view, Huawei-style.
fn x_this(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let mut lines = vec!["#".to_owned()];
    match device.cli.view.clone() {
        CliView::UserView | CliView::SystemView => {
            lines.push(format!("sysname {}", device.hostname));
            for vlan in &device.vlans {
                lines.push(format!("vlan {vlan}"));
            }
        }
        CliView::InterfaceView { port } => {
            if let Some(port) = device.port(&port) {
                lines.push(format!("interface {}", port.id));
                match port.config.mode {
                    LinkMode::Access if port.config.access_vlan != 1 => {
                        lines.push(" port link-type access".to_owned());
                        lines.push(format!(" port default vlan {}", port.config.access_vlan));
                    }
                    LinkMode::Trunk | LinkMode::Hybrid => {
                        lines.push(" port link-type trunk".to_owned());
                        let vlans: Vec<String> =
                            port.config.allowed_vlans.iter().map(ToString::to_string).collect();
                        lines.push(format!(" port trunk allow-pass vlan {}", vlans.join(" ")));
                    }
                    _ => {}
                }
                if let (Some(ip), Some(mask)) = (port.config.ip, port.config.mask) {
                    lines.push(format!(" ip address {ip} {mask}"));
                }
                if !port.admin_up {
                    lines.push(" shutdown".to_owned());
                }
            }
        }
        CliView::AclView { acl_id } => {
            lines.push(format!("acl number {acl_id}"));
            lines.extend(
                device
                    .acl_rules
                    .iter()
                    .filter(|r| r.acl_id == acl_id)
                    .map(rule_line),
            );
        }
        CliView::BgpView { as_number } => {
            lines.push(format!("bgp {as_number}"));
            if let Some(cfg) = &device.bgp {
                if let Some(id) = cfg.router_id {
                    lines.push(format!(" router-id {id}"));
                }
                for peer in &cfg.neighbors {
                    lines.push(format!(" peer {} as-number {}", peer.address, peer.remote_as));
                }
                for network in &cfg.networks {
                    lines.push(format!(" network {network}"));
                }
            }
        }
        CliView::PoolView { pool } => {
            if let Some(pool) = device.pool(&pool) {
                lines.push(format!("ip pool {}", pool.name));
                lines.extend(pool_block(pool).into_iter().skip(1).map(|l| format!(" {l}")));
            }
        }
    }
    lines.push("#".to_owned());
    Ok(lines)
}

pub(super) fn install(registry: &mut CommandRegistry) {
    let displays: &[(&'static str, crate::engine::command::MatchFn,
        crate::engine::command::ValidateFn, crate::engine::command::ExecuteFn)] = &[
        ("display vlan", m_vlan, util::no_validation, x_vlan),
        ("display ip interface brief", m_ip_interface, util::no_validation, x_ip_interface),
        ("display ip routing-table", m_routing_table, util::no_validation, x_routing_table),
        ("display ip pool", m_ip_pool, v_ip_pool, x_ip_pool),
        ("display acl", m_acl, util::no_validation, x_acl),
        ("display bgp peer", m_bgp_peer, util::no_validation, x_bgp_peer),
        ("display stp brief", m_stp, util::no_validation, x_stp),
        ("display vrrp", m_vrrp, util::no_validation, x_vrrp),
        ("display nat session", m_nat_session, util::no_validation, x_nat_session),
        ("display qos statistics", m_qos, v_qos, x_qos),
        ("display logbuffer", m_logbuffer, util::no_validation, x_logbuffer),
        ("display version", m_version, util::no_validation, x_version),
        ("display this", m_this, util::no_validation, x_this),
    ];
    // "display ip pool" must precede "display ip routing-table"? They
    // match disjoint token streams; order here only groups the family.
    for (name, matches, validate, execute) in displays {
        registry.register(CommandDescriptor {
            name,
            aliases: &[],
            vendor: VendorAffinity::Any,
            required_views: &[],
            matches: *matches,
            validate: *validate,
            execute: *execute,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{NetworkPort, RouteEntry, RouteProtocol};
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    fn input<'t>(line: &str, topology: &'t Topology) -> CommandInput<'t> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
        CommandInput {
            line: line.to_owned(),
            raw_tokens: tokens.clone(),
            tokens,
            vendor: Vendor::Huawei,
            topology,
        }
    }

    #[test]
    fn interface_brief_columns_are_fixed_width() {
        let topology = Topology::default();
        let mut dev = NetworkDevice::new("r1", "R1", "huawei", "00:00:00:00:00:01");
        let mut up = NetworkPort::gigabit("0/0/1").with_ip(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(255, 255, 255, 0),
        );
        up.link_up = true;
        dev.ports.push(up);
        let mut down = NetworkPort::gigabit("0/0/2");
        down.admin_up = false;
        dev.ports.push(down);

        let lines = x_ip_interface(&mut dev, &input("display ip interface brief", &topology)).unwrap();
        assert_eq!(
            lines[1],
            "GigabitEthernet0/0/1              10.0.0.1/24          up        up"
        );
        assert_eq!(
            lines[2],
            "GigabitEthernet0/0/2              unassigned           *down     down"
        );
    }

    #[test]
    fn routing_table_renders_each_route() {
        let topology = Topology::default();
        let mut dev = NetworkDevice::new("r1", "R1", "huawei", "00:00:00:00:00:01");
        dev.routing_table.push(RouteEntry {
            destination: "10.0.0.0/24".parse().unwrap(),
            protocol: RouteProtocol::Direct,
            preference: 0,
            cost: 0,
            next_hop: Ipv4Addr::new(10, 0, 0, 1),
            interface: "GigabitEthernet0/0/1".to_owned(),
        });
        let lines = x_routing_table(&mut dev, &input("display ip routing-table", &topology)).unwrap();
        assert_eq!(lines[0], "Routing Tables: Public, 1 routes");
        assert_eq!(
            lines[2],
            "10.0.0.0/24          Direct  0    0     10.0.0.1         GigabitEthernet0/0/1"
        );
    }

    #[test]
    fn acl_display_appends_match_counters() {
        let topology = Topology::default();
        let mut dev = NetworkDevice::new("r1", "R1", "huawei", "00:00:00:00:00:01");
        let mut rule = AclRule::new(
            3001,
            5,
            AclAction::Deny,
            crate::eval::ip::Protocol::Tcp,
        )
        .with_src("10.0.0.0/24".parse().unwrap());
        rule.hits = 3;
        dev.acl_rules.push(rule);

        let lines = x_acl(&mut dev, &input("display acl all", &topology)).unwrap();
        assert_eq!(lines[0], "Advanced ACL 3001, 1 rules");
        assert_eq!(
            lines[1],
            " rule 5 deny tcp source 10.0.0.0/24 destination 0.0.0.0/0 (3 matches)"
        );
    }

    #[test]
    fn vrrp_elects_across_the_topology() {
        let group = |priority| VrrpGroup {
            vrid: 1,
            interface: "GigabitEthernet0/0/1".to_owned(),
            virtual_ip: Ipv4Addr::new(10, 0, 0, 254),
            priority,
        };
        let mut a = NetworkDevice::new("A", "A", "huawei", "00:00:00:00:00:0a");
        a.vrrp_groups.push(group(100));
        let mut b = NetworkDevice::new("B", "B", "huawei", "00:00:00:00:00:0b");
        b.vrrp_groups.push(group(120));
        let topology = Topology {
            devices: vec![a.clone(), b],
            cables: Vec::new(),
        };

        let lines = x_vrrp(&mut a, &input("display vrrp", &topology)).unwrap();
        assert!(lines[1].ends_with("Backup"));
    }
}
