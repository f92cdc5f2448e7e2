// ── View navigation and system-view configuration ──

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::profile::Vendor;
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::model::{CliView, NetworkDevice, ViewKind};

use super::util;

// ── system-view / configure terminal / enable ───────────────────────

fn m_system_view(ctx: &CommandContext) -> bool {
    ctx.input.head_is("system-view")
}

fn x_system_view(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    device.cli.enter(CliView::SystemView);
    Ok(vec![
        "Enter system view, return user view with Ctrl+Z.".to_owned(),
    ])
}

fn m_configure_terminal(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["configure", "terminal"])
}

fn x_configure_terminal(
    device: &mut NetworkDevice,
    _: &CommandInput,
) -> Result<Vec<String>, CommandError> {
    device.cli.enter(CliView::SystemView);
    Ok(vec![
        "Enter configuration commands, one per line.  End with CNTL/Z.".to_owned(),
    ])
}

fn m_enable(ctx: &CommandContext) -> bool {
    ctx.input.head_is("enable")
}

fn x_enable(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    device.cli.privileged = true;
    Ok(Vec::new())
}

// ── quit / end ──────────────────────────────────────────────────────

fn m_quit(ctx: &CommandContext) -> bool {
    ctx.input.head_is("quit") || ctx.input.head_is("exit")
}

fn x_quit(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    device.cli.pop_view();
    Ok(Vec::new())
}

fn m_end(ctx: &CommandContext) -> bool {
    ctx.input.head_is("end")
}

fn x_end(device: &mut NetworkDevice, _: &CommandInput) -> Result<Vec<String>, CommandError> {
    device.cli.reset();
    Ok(Vec::new())
}

// ── sysname / hostname ──────────────────────────────────────────────

fn m_sysname(ctx: &CommandContext) -> bool {
    ctx.input.head_is("sysname")
}

fn m_hostname(ctx: &CommandContext) -> bool {
    ctx.input.head_is("hostname")
}

fn v_rename(ctx: &CommandContext) -> Result<(), CommandError> {
    util::require(ctx.input, 1, "hostname").map(|_| ())
}

fn x_rename(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    device.hostname = util::require_raw(input, 1, "hostname")?.to_owned();
    Ok(Vec::new())
}

// ── vlan / undo vlan / no vlan ──────────────────────────────────────

fn m_vlan(ctx: &CommandContext) -> bool {
    ctx.input.head_is("vlan")
}

fn v_vlan(ctx: &CommandContext) -> Result<(), CommandError> {
    util::parse_vlan(util::require(ctx.input, 1, "vlan id")?).map(|_| ())
}

fn x_vlan(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let vlan = util::parse_vlan(util::require(input, 1, "vlan id")?)?;
    device.vlans.insert(vlan);
    Ok(Vec::new())
}

fn m_undo_vlan(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["undo", "vlan"])
}

fn m_no_vlan(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["no", "vlan"])
}

fn v_remove_vlan(ctx: &CommandContext) -> Result<(), CommandError> {
    let vlan = util::parse_vlan(util::require(ctx.input, 2, "vlan id")?)?;
    if !ctx.device.vlans.contains(&vlan) {
        return Err(CommandError::NotFound {
            what: "vlan",
            identifier: vlan.to_string(),
        });
    }
    Ok(())
}

/// Removing a VLAN also repairs port references so no port is left
/// pointing at a VLAN absent from the device.
fn x_remove_vlan(
    device: &mut NetworkDevice,
    input: &CommandInput,
) -> Result<Vec<String>, CommandError> {
    let vlan = util::parse_vlan(util::require(input, 2, "vlan id")?)?;
    device.vlans.remove(&vlan);
    for port in &mut device.ports {
        if port.config.access_vlan == vlan {
            port.config.access_vlan = 1;
        }
        port.config.allowed_vlans.remove(&vlan);
    }
    Ok(Vec::new())
}

pub(super) fn install(registry: &mut CommandRegistry) {
    registry.register(CommandDescriptor {
        name: "system-view",
        aliases: &["sys"],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::UserView],
        matches: m_system_view,
        validate: util::no_validation,
        execute: x_system_view,
    });
    registry.register(CommandDescriptor {
        name: "configure terminal",
        aliases: &["conf t"],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::UserView],
        matches: m_configure_terminal,
        validate: util::no_validation,
        execute: x_configure_terminal,
    });
    registry.register(CommandDescriptor {
        name: "enable",
        aliases: &["en"],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::UserView],
        matches: m_enable,
        validate: util::no_validation,
        execute: x_enable,
    });
    registry.register(CommandDescriptor {
        name: "quit",
        aliases: &["exit"],
        vendor: VendorAffinity::Any,
        required_views: &[],
        matches: m_quit,
        validate: util::no_validation,
        execute: x_quit,
    });
    registry.register(CommandDescriptor {
        name: "end",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[],
        matches: m_end,
        validate: util::no_validation,
        execute: x_end,
    });
    registry.register(CommandDescriptor {
        name: "sysname",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::SystemView],
        matches: m_sysname,
        validate: v_rename,
        execute: x_rename,
    });
    registry.register(CommandDescriptor {
        name: "hostname",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::SystemView],
        matches: m_hostname,
        validate: v_rename,
        execute: x_rename,
    });
    // "undo vlan"/"no vlan" register before the bare "vlan" creator so
    // the more specific forms shadow it.
    registry.register(CommandDescriptor {
        name: "undo vlan",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::SystemView],
        matches: m_undo_vlan,
        validate: v_remove_vlan,
        execute: x_remove_vlan,
    });
    registry.register(CommandDescriptor {
        name: "no vlan",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::SystemView],
        matches: m_no_vlan,
        validate: v_remove_vlan,
        execute: x_remove_vlan,
    });
    registry.register(CommandDescriptor {
        name: "vlan",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::SystemView],
        matches: m_vlan,
        validate: v_vlan,
        execute: x_vlan,
    });
}
