// ── Interface selection and interface-view configuration ──

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::profile::Vendor;
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::eval::ip::{self, Cidr};
use crate::model::{
    CliView, LinkMode, NetworkDevice, RouteEntry, RouteProtocol, ViewKind,
};

use super::util;

// ── interface <name> ────────────────────────────────────────────────

fn m_interface(ctx: &CommandContext) -> bool {
    ctx.input.head_is("interface")
}

fn v_interface(ctx: &CommandContext) -> Result<(), CommandError> {
    let ident = util::joined_ident(ctx.input, 1);
    if ident.is_empty() {
        return Err(CommandError::MissingArgument { what: "interface" });
    }
    if ctx.device.port(&ident).is_none() {
        return Err(CommandError::NotFound {
            what: "interface",
            identifier: ident,
        });
    }
    Ok(())
}

fn x_interface(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let ident = util::joined_ident(input, 1);
    let port_id = device
        .port(&ident)
        .map(|p| p.id.clone())
        .ok_or(CommandError::NotFound {
            what: "interface",
            identifier: ident,
        })?;
    device.cli.enter(CliView::InterfaceView { port: port_id });
    Ok(Vec::new())
}

// ── link mode ───────────────────────────────────────────────────────

fn m_port_link_type(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["port", "link-type"])
}

fn m_switchport_mode(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["switchport", "mode"])
}

fn parse_mode(value: &str) -> Result<LinkMode, CommandError> {
    match value {
        "access" => Ok(LinkMode::Access),
        "trunk" => Ok(LinkMode::Trunk),
        "hybrid" => Ok(LinkMode::Hybrid),
        other => Err(CommandError::InvalidArgument {
            what: "link mode",
            value: other.to_owned(),
        }),
    }
}

fn v_link_mode(ctx: &CommandContext) -> Result<(), CommandError> {
    parse_mode(util::require(ctx.input, 2, "link mode")?).map(|_| ())
}

fn x_link_mode(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let mode = parse_mode(util::require(input, 2, "link mode")?)?;
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    port.config.mode = mode;
    if matches!(mode, LinkMode::Trunk | LinkMode::Hybrid) && port.config.allowed_vlans.is_empty() {
        port.config.allowed_vlans.insert(1);
    }
    Ok(Vec::new())
}

// ── access VLAN assignment ──────────────────────────────────────────

fn m_port_default_vlan(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["port", "default", "vlan"])
}

fn m_switchport_access_vlan(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["switchport", "access", "vlan"])
}

fn v_access_vlan(ctx: &CommandContext) -> Result<(), CommandError> {
    let vlan = util::parse_vlan(util::require(ctx.input, 3, "vlan id")?)?;
    if !ctx.device.has_vlan(vlan) {
        return Err(CommandError::NotFound {
            what: "vlan",
            identifier: vlan.to_string(),
        });
    }
    Ok(())
}

fn x_access_vlan(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let vlan = util::parse_vlan(util::require(input, 3, "vlan id")?)?;
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    if port.config.mode != LinkMode::Access {
        return Err(CommandError::precondition(
            "Port link-type is not access.",
        ));
    }
    port.config.access_vlan = vlan;
    Ok(Vec::new())
}

// ── trunk allowed VLANs ─────────────────────────────────────────────

fn m_trunk_allow(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["port", "trunk", "allow-pass", "vlan"])
}

fn m_switchport_trunk_allowed(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["switchport", "trunk", "allowed", "vlan"])
}

fn v_trunk_vlans(ctx: &CommandContext) -> Result<(), CommandError> {
    let vlans = util::parse_vlan_list(ctx.input.args_after(4))?;
    for vlan in vlans {
        if !ctx.device.has_vlan(vlan) {
            return Err(CommandError::NotFound {
                what: "vlan",
                identifier: vlan.to_string(),
            });
        }
    }
    Ok(())
}

fn x_trunk_vlans(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let vlans = util::parse_vlan_list(input.args_after(4))?;
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    if !matches!(port.config.mode, LinkMode::Trunk | LinkMode::Hybrid) {
        return Err(CommandError::precondition("Port link-type is not trunk."));
    }
    port.config.allowed_vlans.extend(vlans);
    Ok(Vec::new())
}

// ── ip address ──────────────────────────────────────────────────────

fn m_ip_address(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["ip", "address"])
}

fn v_ip_address(ctx: &CommandContext) -> Result<(), CommandError> {
    util::parse_ip(util::require(ctx.input, 2, "ip address")?, "ip address")?;
    util::parse_mask(util::require(ctx.input, 3, "mask")?)?;
    Ok(())
}

/// Assigning an address makes the port routed and installs the
/// connected route.
fn x_ip_address(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let addr = util::parse_ip(util::require(input, 2, "ip address")?, "ip address")?;
    let mask = util::parse_mask(util::require(input, 3, "mask")?)?;
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    port.config.ip = Some(addr);
    port.config.mask = Some(mask);
    port.config.mode = LinkMode::Routed;

    let prefix = ip::prefix_from_mask(mask).unwrap_or(32);
    let destination = Cidr::new(Cidr::new(addr, prefix).network(), prefix);
    device
        .routing_table
        .retain(|r| !(r.interface == port_id && r.protocol == RouteProtocol::Direct));
    device.routing_table.push(RouteEntry {
        destination,
        protocol: RouteProtocol::Direct,
        preference: 0,
        cost: 0,
        next_hop: addr,
        interface: port_id,
    });
    Ok(Vec::new())
}

// ── shutdown / undo shutdown / no shutdown ──────────────────────────

fn m_shutdown(ctx: &CommandContext) -> bool {
    ctx.input.head_is("shutdown")
}

fn m_undo_shutdown(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["undo", "shutdown"])
}

fn m_no_shutdown(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["no", "shutdown"])
}

fn x_shutdown(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    port.admin_up = false;
    port.link_up = false;
    Ok(Vec::new())
}

fn x_bring_up(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    port.admin_up = true;
    port.link_up = true;
    Ok(Vec::new())
}

// ── qos ─────────────────────────────────────────────────────────────

fn m_qos_queue(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["qos", "queue"])
}

fn v_qos_queue(ctx: &CommandContext) -> Result<(), CommandError> {
    let queue = util::parse_u8(util::require(ctx.input, 2, "queue")?, "queue")?;
    if queue > 7 {
        return Err(CommandError::InvalidArgument {
            what: "queue",
            value: queue.to_string(),
        });
    }
    if util::require(ctx.input, 3, "weight keyword")? != "weight" {
        return Err(CommandError::InvalidArgument {
            what: "weight keyword",
            value: ctx.input.token(3).unwrap_or_default().to_owned(),
        });
    }
    let weight = util::parse_u32(util::require(ctx.input, 4, "weight")?, "weight")?;
    if weight == 0 {
        return Err(CommandError::InvalidArgument {
            what: "weight",
            value: weight.to_string(),
        });
    }
    Ok(())
}

fn x_qos_queue(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let queue = util::parse_u8(util::require(input, 2, "queue")?, "queue")?;
    let weight = util::parse_u32(util::require(input, 4, "weight")?, "weight")?;
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    port.config.qos.queue_weights.insert(queue, weight);
    Ok(Vec::new())
}

fn m_qos_shaping(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["qos", "shaping"])
}

fn shaping_value(input: &CommandInput) -> Result<u8, CommandError> {
    // Accept `qos shaping percent <p>` and `qos shaping <p>`.
    let index = if input.token(2) == Some("percent") { 3 } else { 2 };
    let pct = util::parse_u8(util::require(input, index, "shaping percent")?, "shaping percent")?;
    if (1..=100).contains(&pct) {
        Ok(pct)
    } else {
        Err(CommandError::InvalidArgument {
            what: "shaping percent",
            value: pct.to_string(),
        })
    }
}

fn v_qos_shaping(ctx: &CommandContext) -> Result<(), CommandError> {
    shaping_value(ctx.input).map(|_| ())
}

fn x_qos_shaping(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let pct = shaping_value(input)?;
    let port_id = current_port(device)?;
    let port = device
        .port_mut(&port_id)
        .ok_or_else(|| CommandError::precondition("The selected interface no longer exists."))?;
    port.config.qos.shaping_percent = Some(pct);
    Ok(Vec::new())
}

fn current_port(device: &NetworkDevice) -> Result<String, CommandError> {
    util::view_port(device)
        .ok_or_else(|| CommandError::precondition("No interface is selected."))
}

pub(super) fn install(registry: &mut CommandRegistry) {
    registry.register(CommandDescriptor {
        name: "interface",
        aliases: &["int"],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::SystemView],
        matches: m_interface,
        validate: v_interface,
        execute: x_interface,
    });
    registry.register(CommandDescriptor {
        name: "port link-type",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::InterfaceView],
        matches: m_port_link_type,
        validate: v_link_mode,
        execute: x_link_mode,
    });
    registry.register(CommandDescriptor {
        name: "switchport mode",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::InterfaceView],
        matches: m_switchport_mode,
        validate: v_link_mode,
        execute: x_link_mode,
    });
    registry.register(CommandDescriptor {
        name: "port default vlan",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::InterfaceView],
        matches: m_port_default_vlan,
        validate: v_access_vlan,
        execute: x_access_vlan,
    });
    registry.register(CommandDescriptor {
        name: "switchport access vlan",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::InterfaceView],
        matches: m_switchport_access_vlan,
        validate: v_access_vlan,
        execute: x_access_vlan,
    });
    registry.register(CommandDescriptor {
        name: "port trunk allow-pass vlan",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::InterfaceView],
        matches: m_trunk_allow,
        validate: v_trunk_vlans,
        execute: x_trunk_vlans,
    });
    registry.register(CommandDescriptor {
        name: "switchport trunk allowed vlan",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::InterfaceView],
        matches: m_switchport_trunk_allowed,
        validate: v_trunk_vlans,
        execute: x_trunk_vlans,
    });
    registry.register(CommandDescriptor {
        name: "ip address",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::InterfaceView],
        matches: m_ip_address,
        validate: v_ip_address,
        execute: x_ip_address,
    });
    // "undo shutdown"/"no shutdown" register before "shutdown".
    registry.register(CommandDescriptor {
        name: "undo shutdown",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::InterfaceView],
        matches: m_undo_shutdown,
        validate: util::no_validation,
        execute: x_bring_up,
    });
    registry.register(CommandDescriptor {
        name: "no shutdown",
        aliases: &["no shut"],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::InterfaceView],
        matches: m_no_shutdown,
        validate: util::no_validation,
        execute: x_bring_up,
    });
    registry.register(CommandDescriptor {
        name: "shutdown",
        aliases: &["shut"],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::InterfaceView],
        matches: m_shutdown,
        validate: util::no_validation,
        execute: x_shutdown,
    });
    registry.register(CommandDescriptor {
        name: "qos queue",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::InterfaceView],
        matches: m_qos_queue,
        validate: v_qos_queue,
        execute: x_qos_queue,
    });
    registry.register(CommandDescriptor {
        name: "qos shaping",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::InterfaceView],
        matches: m_qos_shaping,
        validate: v_qos_shaping,
        execute: x_qos_shaping,
    });
}
