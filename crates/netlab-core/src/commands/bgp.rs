// ── BGP view entry and neighbor/network configuration ──
//
// Control-plane state is configuration data only. Peer state is decided
// at configuration time: Established when a physical path to the peer
// address exists in the topology snapshot, Idle otherwise.

use std::net::Ipv4Addr;

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::profile::Vendor;
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::eval::ip::{self, Cidr};
use crate::eval::path;
use crate::model::{
    BgpConfig, BgpNeighbor, BgpPeerState, CliView, NetworkDevice, ViewKind,
};

use super::util;

// ── bgp <as> / router bgp <as> ──────────────────────────────────────

fn m_bgp(ctx: &CommandContext) -> bool {
    ctx.input.head_is("bgp")
}

fn m_router_bgp(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["router", "bgp"])
}

fn as_number(input: &CommandInput, index: usize) -> Result<u32, CommandError> {
    let value = util::require(input, index, "as number")?;
    let asn = util::parse_u32(value, "as number")?;
    if asn == 0 {
        return Err(CommandError::InvalidArgument {
            what: "as number",
            value: value.to_owned(),
        });
    }
    Ok(asn)
}

fn v_bgp(ctx: &CommandContext) -> Result<(), CommandError> {
    as_number(ctx.input, 1).map(|_| ())
}

fn v_router_bgp(ctx: &CommandContext) -> Result<(), CommandError> {
    as_number(ctx.input, 2).map(|_| ())
}

/// First entry initializes `BgpConfig`; re-entry with a different AS is
/// rejected, matching real devices that run a single BGP process.
fn enter_bgp(device: &mut NetworkDevice, asn: u32) -> Result<Vec<String>, CommandError> {
    match &device.bgp {
        Some(cfg) if cfg.as_number != asn => Err(CommandError::precondition(
            "BGP is already running with a different AS number.",
        )),
        Some(_) => {
            device.cli.enter(CliView::BgpView { as_number: asn });
            Ok(Vec::new())
        }
        None => {
            device.bgp = Some(BgpConfig::new(asn));
            device.cli.enter(CliView::BgpView { as_number: asn });
            Ok(Vec::new())
        }
    }
}

fn x_bgp(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let asn = as_number(input, 1)?;
    enter_bgp(device, asn)
}

fn x_router_bgp(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let asn = as_number(input, 2)?;
    enter_bgp(device, asn)
}

// ── router-id <ip> ──────────────────────────────────────────────────

fn m_router_id(ctx: &CommandContext) -> bool {
    ctx.input.head_is("router-id") || ctx.input.starts_with(&["bgp", "router-id"])
}

fn router_id_arg(input: &CommandInput) -> Result<Ipv4Addr, CommandError> {
    let index = if input.head_is("router-id") { 1 } else { 2 };
    util::parse_ip(util::require(input, index, "router id")?, "router id")
}

fn v_router_id(ctx: &CommandContext) -> Result<(), CommandError> {
    router_id_arg(ctx.input).map(|_| ())
}

fn x_router_id(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let id = router_id_arg(input)?;
    let cfg = device
        .bgp
        .as_mut()
        .ok_or_else(|| CommandError::precondition("BGP is not running."))?;
    cfg.router_id = Some(id);
    Ok(Vec::new())
}

// ── peer <ip> as-number <as> / neighbor <ip> remote-as <as> ─────────

fn m_peer(ctx: &CommandContext) -> bool {
    ctx.input.head_is("peer")
}

fn m_neighbor(ctx: &CommandContext) -> bool {
    ctx.input.head_is("neighbor")
}

fn peer_args(input: &CommandInput) -> Result<(Ipv4Addr, u32), CommandError> {
    let addr = util::parse_ip(util::require(input, 1, "peer address")?, "peer address")?;
    let keyword = util::require(input, 2, "as-number keyword")?;
    if keyword != "as-number" && keyword != "remote-as" {
        return Err(CommandError::InvalidArgument {
            what: "as-number keyword",
            value: keyword.to_owned(),
        });
    }
    let asn = as_number(input, 3)?;
    Ok((addr, asn))
}

fn v_peer(ctx: &CommandContext) -> Result<(), CommandError> {
    peer_args(ctx.input).map(|_| ())
}

fn x_peer(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let (addr, remote_as) = peer_args(input)?;
    let state = match input.topology.device_by_ip(addr) {
        Some(remote) if path::find_path(input.topology, &device.id, &remote.id, None).is_some() => {
            BgpPeerState::Established
        }
        _ => BgpPeerState::Idle,
    };
    let cfg = device
        .bgp
        .as_mut()
        .ok_or_else(|| CommandError::precondition("BGP is not running."))?;
    if let Some(existing) = cfg.neighbors.iter_mut().find(|n| n.address == addr) {
        existing.remote_as = remote_as;
        existing.state = state;
    } else {
        cfg.neighbors.push(BgpNeighbor {
            address: addr,
            remote_as,
            state,
        });
    }
    Ok(Vec::new())
}

// ── network <ip> [mask] ─────────────────────────────────────────────

fn m_network(ctx: &CommandContext) -> bool {
    ctx.input.head_is("network")
}

fn network_arg(input: &CommandInput) -> Result<Cidr, CommandError> {
    let addr = util::parse_ip(util::require(input, 1, "network address")?, "network address")?;
    let mask = match input.token(2) {
        Some(raw) => util::parse_mask(raw)?,
        // Classful default mirrors what the CLI assumes when omitted.
        None => Ipv4Addr::new(255, 255, 255, 0),
    };
    let prefix = ip::prefix_from_mask(mask).unwrap_or(24);
    Ok(Cidr::new(Cidr::new(addr, prefix).network(), prefix))
}

fn v_network(ctx: &CommandContext) -> Result<(), CommandError> {
    network_arg(ctx.input).map(|_| ())
}

fn x_network(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let cidr = network_arg(input)?;
    let cfg = device
        .bgp
        .as_mut()
        .ok_or_else(|| CommandError::precondition("BGP is not running."))?;
    if !cfg.networks.contains(&cidr) {
        cfg.networks.push(cidr);
    }
    Ok(Vec::new())
}

pub(super) fn install(registry: &mut CommandRegistry) {
    registry.register(CommandDescriptor {
        name: "bgp",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::SystemView],
        matches: m_bgp,
        validate: v_bgp,
        execute: x_bgp,
    });
    registry.register(CommandDescriptor {
        name: "router bgp",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::SystemView],
        matches: m_router_bgp,
        validate: v_router_bgp,
        execute: x_router_bgp,
    });
    registry.register(CommandDescriptor {
        name: "router-id",
        aliases: &["bgp router-id"],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::BgpView],
        matches: m_router_id,
        validate: v_router_id,
        execute: x_router_id,
    });
    registry.register(CommandDescriptor {
        name: "peer",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::BgpView],
        matches: m_peer,
        validate: v_peer,
        execute: x_peer,
    });
    registry.register(CommandDescriptor {
        name: "neighbor",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::BgpView],
        matches: m_neighbor,
        validate: v_peer,
        execute: x_peer,
    });
    registry.register(CommandDescriptor {
        name: "network",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::BgpView],
        matches: m_network,
        validate: v_network,
        execute: x_network,
    });
}
