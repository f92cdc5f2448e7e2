// ── Shared argument parsing for the command vocabulary ──

use std::net::Ipv4Addr;

use crate::engine::command::{CommandContext, CommandInput};
use crate::error::CommandError;
use crate::eval::ip;
use crate::model::{CliView, NetworkDevice};

/// Validate no-op for commands with nothing to check.
pub(crate) fn no_validation(_: &CommandContext) -> Result<(), CommandError> {
    Ok(())
}

pub(crate) fn require<'a>(
    input: &'a CommandInput,
    index: usize,
    what: &'static str,
) -> Result<&'a str, CommandError> {
    input
        .token(index)
        .ok_or(CommandError::MissingArgument { what })
}

pub(crate) fn require_raw<'a>(
    input: &'a CommandInput,
    index: usize,
    what: &'static str,
) -> Result<&'a str, CommandError> {
    input
        .raw_token(index)
        .ok_or(CommandError::MissingArgument { what })
}

pub(crate) fn parse_u8(value: &str, what: &'static str) -> Result<u8, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        what,
        value: value.to_owned(),
    })
}

pub(crate) fn parse_u32(value: &str, what: &'static str) -> Result<u32, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        what,
        value: value.to_owned(),
    })
}

/// VLAN ids 2-4094 are configurable; 1 is the implicit default VLAN.
pub(crate) fn parse_vlan(value: &str) -> Result<u16, CommandError> {
    let invalid = || CommandError::InvalidArgument {
        what: "vlan id",
        value: value.to_owned(),
    };
    let vlan: u16 = value.parse().map_err(|_| invalid())?;
    if (2..=4094).contains(&vlan) {
        Ok(vlan)
    } else {
        Err(invalid())
    }
}

pub(crate) fn parse_ip(value: &str, what: &'static str) -> Result<Ipv4Addr, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        what,
        value: value.to_owned(),
    })
}

/// A contiguous dotted-decimal mask.
pub(crate) fn parse_mask(value: &str) -> Result<Ipv4Addr, CommandError> {
    let invalid = || CommandError::InvalidArgument {
        what: "mask",
        value: value.to_owned(),
    };
    let mask: Ipv4Addr = value.parse().map_err(|_| invalid())?;
    ip::prefix_from_mask(mask).ok_or_else(invalid)?;
    Ok(mask)
}

/// VLAN list: `10 20 30`, `2 to 10`, or comma-separated `10,20,30`.
pub(crate) fn parse_vlan_list(args: &[String]) -> Result<Vec<u16>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::MissingArgument { what: "vlan list" });
    }
    let mut vlans = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let piece = &args[i];
        if args.get(i + 1).map(String::as_str) == Some("to") {
            let end = args.get(i + 2).ok_or(CommandError::MissingArgument {
                what: "vlan range end",
            })?;
            let lo = parse_vlan(piece)?;
            let hi = parse_vlan(end)?;
            if hi < lo {
                return Err(CommandError::InvalidArgument {
                    what: "vlan range",
                    value: format!("{lo} to {hi}"),
                });
            }
            vlans.extend(lo..=hi);
            i += 3;
        } else {
            for part in piece.split(',').filter(|p| !p.is_empty()) {
                vlans.push(parse_vlan(part)?);
            }
            i += 1;
        }
    }
    Ok(vlans)
}

// ── Scoped-context accessors ────────────────────────────────────────

pub(crate) fn view_port(device: &NetworkDevice) -> Option<String> {
    match &device.cli.view {
        CliView::InterfaceView { port } => Some(port.clone()),
        _ => None,
    }
}

pub(crate) fn view_pool(device: &NetworkDevice) -> Option<String> {
    match &device.cli.view {
        CliView::PoolView { pool } => Some(pool.clone()),
        _ => None,
    }
}

pub(crate) fn view_acl(device: &NetworkDevice) -> Option<u32> {
    match device.cli.view {
        CliView::AclView { acl_id } => Some(acl_id),
        _ => None,
    }
}

/// Interface identifier possibly split across tokens
/// (`interface GigabitEthernet 0/0/1`).
pub(crate) fn joined_ident(input: &CommandInput, from: usize) -> String {
    input.args_after(from).join("")
}
