// ── ACL view entry and rule editing ──

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::eval::ip::{Cidr, PortMatch, Protocol};
use crate::model::{AclAction, AclRule, CliView, NetworkDevice, ViewKind};

use super::util;

// ── acl <number> ────────────────────────────────────────────────────

fn m_acl(ctx: &CommandContext) -> bool {
    ctx.input.head_is("acl")
}

fn acl_number(input: &CommandInput) -> Result<u32, CommandError> {
    let value = util::require(input, 1, "acl number")?;
    let id = util::parse_u32(value, "acl number")?;
    if (2000..=3999).contains(&id) {
        Ok(id)
    } else {
        Err(CommandError::InvalidArgument {
            what: "acl number",
            value: value.to_owned(),
        })
    }
}

fn v_acl(ctx: &CommandContext) -> Result<(), CommandError> {
    acl_number(ctx.input).map(|_| ())
}

fn x_acl(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let acl_id = acl_number(input)?;
    device.cli.enter(CliView::AclView { acl_id });
    Ok(Vec::new())
}

// ── rule <id> permit|deny … ─────────────────────────────────────────

fn m_rule(ctx: &CommandContext) -> bool {
    ctx.input.head_is("rule")
}

struct ParsedRule {
    rule_id: u32,
    action: AclAction,
    protocol: Protocol,
    src: Cidr,
    dst: Cidr,
    src_port: PortMatch,
    dst_port: PortMatch,
}

fn parse_protocol(value: &str) -> Result<Protocol, CommandError> {
    match value {
        "ip" => Ok(Protocol::Ip),
        "tcp" => Ok(Protocol::Tcp),
        "udp" => Ok(Protocol::Udp),
        "icmp" => Ok(Protocol::Icmp),
        other => Err(CommandError::InvalidArgument {
            what: "protocol",
            value: other.to_owned(),
        }),
    }
}

fn parse_cidr(value: &str, what: &'static str) -> Result<Cidr, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        what,
        value: value.to_owned(),
    })
}

/// Port clause starting at `args[i]`: `eq <n>` or `range <lo> <hi>`.
/// Returns the match and the number of tokens consumed.
fn parse_port_clause(args: &[String], i: usize) -> Result<(PortMatch, usize), CommandError> {
    match args.get(i).map(String::as_str) {
        Some("eq") => {
            let port = args.get(i + 1).ok_or(CommandError::MissingArgument {
                what: "port number",
            })?;
            let port: u16 = port.parse().map_err(|_| CommandError::InvalidArgument {
                what: "port number",
                value: port.clone(),
            })?;
            Ok((PortMatch::Eq(port), 2))
        }
        Some("range") => {
            let lo = args.get(i + 1).ok_or(CommandError::MissingArgument {
                what: "port range start",
            })?;
            let hi = args.get(i + 2).ok_or(CommandError::MissingArgument {
                what: "port range end",
            })?;
            let lo: u16 = lo.parse().map_err(|_| CommandError::InvalidArgument {
                what: "port range start",
                value: lo.clone(),
            })?;
            let hi: u16 = hi.parse().map_err(|_| CommandError::InvalidArgument {
                what: "port range end",
                value: hi.clone(),
            })?;
            if hi < lo {
                return Err(CommandError::InvalidArgument {
                    what: "port range",
                    value: format!("{lo} {hi}"),
                });
            }
            Ok((PortMatch::Range(lo, hi), 3))
        }
        Some(other) => Err(CommandError::InvalidArgument {
            what: "port operator",
            value: other.to_owned(),
        }),
        None => Err(CommandError::MissingArgument {
            what: "port operator",
        }),
    }
}

/// `rule <id> permit|deny <proto> [source <cidr|any> [source-port …]]
/// [destination <cidr|any> [destination-port …]]`. Clause order after
/// the protocol is free.
fn parse_rule(input: &CommandInput) -> Result<ParsedRule, CommandError> {
    let rule_id = util::parse_u32(util::require(input, 1, "rule id")?, "rule id")?;
    let action = match util::require(input, 2, "action")? {
        "permit" => AclAction::Permit,
        "deny" => AclAction::Deny,
        other => {
            return Err(CommandError::InvalidArgument {
                what: "action",
                value: other.to_owned(),
            })
        }
    };
    let protocol = parse_protocol(util::require(input, 3, "protocol")?)?;

    let mut parsed = ParsedRule {
        rule_id,
        action,
        protocol,
        src: Cidr::ANY,
        dst: Cidr::ANY,
        src_port: PortMatch::Any,
        dst_port: PortMatch::Any,
    };

    let args = input.args_after(4);
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "source" => {
                let value = args.get(i + 1).ok_or(CommandError::MissingArgument {
                    what: "source address",
                })?;
                parsed.src = parse_cidr(value, "source address")?;
                i += 2;
            }
            "destination" => {
                let value = args.get(i + 1).ok_or(CommandError::MissingArgument {
                    what: "destination address",
                })?;
                parsed.dst = parse_cidr(value, "destination address")?;
                i += 2;
            }
            "source-port" => {
                let (m, used) = parse_port_clause(args, i + 1)?;
                parsed.src_port = m;
                i += 1 + used;
            }
            "destination-port" => {
                let (m, used) = parse_port_clause(args, i + 1)?;
                parsed.dst_port = m;
                i += 1 + used;
            }
            other => {
                return Err(CommandError::InvalidArgument {
                    what: "rule clause",
                    value: other.to_owned(),
                })
            }
        }
    }
    Ok(parsed)
}

fn v_rule(ctx: &CommandContext) -> Result<(), CommandError> {
    parse_rule(ctx.input).map(|_| ())
}

/// A rule with an existing id replaces it in place; new ids append in
/// id order within the group so storage order stays evaluation order.
fn x_rule(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let acl_id = util::view_acl(device)
        .ok_or_else(|| CommandError::precondition("No ACL is selected."))?;
    let parsed = parse_rule(input)?;

    let mut rule = AclRule::new(acl_id, parsed.rule_id, parsed.action, parsed.protocol)
        .with_src(parsed.src)
        .with_dst(parsed.dst)
        .with_dst_port(parsed.dst_port);
    rule.src_port = parsed.src_port;

    if let Some(existing) = device
        .acl_rules
        .iter_mut()
        .find(|r| r.acl_id == acl_id && r.rule_id == parsed.rule_id)
    {
        rule.hits = existing.hits;
        *existing = rule;
        return Ok(Vec::new());
    }

    let at = device
        .acl_rules
        .iter()
        .position(|r| r.acl_id == acl_id && r.rule_id > parsed.rule_id)
        .unwrap_or(device.acl_rules.len());
    device.acl_rules.insert(at, rule);
    Ok(Vec::new())
}

// ── undo rule <id> ──────────────────────────────────────────────────

fn m_undo_rule(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["undo", "rule"])
}

fn v_undo_rule(ctx: &CommandContext) -> Result<(), CommandError> {
    let rule_id = util::parse_u32(util::require(ctx.input, 2, "rule id")?, "rule id")?;
    let acl_id = util::view_acl(ctx.device)
        .ok_or_else(|| CommandError::precondition("No ACL is selected."))?;
    if !ctx
        .device
        .acl_rules
        .iter()
        .any(|r| r.acl_id == acl_id && r.rule_id == rule_id)
    {
        return Err(CommandError::NotFound {
            what: "rule",
            identifier: rule_id.to_string(),
        });
    }
    Ok(())
}

fn x_undo_rule(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let rule_id = util::parse_u32(util::require(input, 2, "rule id")?, "rule id")?;
    let acl_id = util::view_acl(device)
        .ok_or_else(|| CommandError::precondition("No ACL is selected."))?;
    device
        .acl_rules
        .retain(|r| !(r.acl_id == acl_id && r.rule_id == rule_id));
    Ok(Vec::new())
}

pub(super) fn install(registry: &mut CommandRegistry) {
    registry.register(CommandDescriptor {
        name: "acl",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::SystemView],
        matches: m_acl,
        validate: v_acl,
        execute: x_acl,
    });
    // "undo rule" registers before "rule" so the undo form shadows it.
    // The "no rule" alias keeps the deletion reachable from the Cisco
    // dialect, so the descriptor lives in the generic bucket.
    registry.register(CommandDescriptor {
        name: "undo rule",
        aliases: &["no rule"],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::AclView],
        matches: m_undo_rule,
        validate: v_undo_rule,
        execute: x_undo_rule,
    });
    registry.register(CommandDescriptor {
        name: "rule",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::AclView],
        matches: m_rule,
        validate: v_rule,
        execute: x_rule,
    });
}
