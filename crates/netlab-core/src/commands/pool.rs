// ── DHCP pool view entry and pool configuration ──

use std::net::Ipv4Addr;

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::profile::Vendor;
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::eval::ip;
use crate::model::{CliView, DhcpPool, MacAddress, NetworkDevice, StaticBinding, ViewKind};

use super::util;

// ── ip pool <name> / ip dhcp pool <name> ────────────────────────────

fn m_ip_pool(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["ip", "pool"])
}

fn m_ip_dhcp_pool(ctx: &CommandContext) -> bool {
    ctx.input.starts_with(&["ip", "dhcp", "pool"])
}

fn v_ip_pool(ctx: &CommandContext) -> Result<(), CommandError> {
    util::require_raw(ctx.input, 2, "pool name").map(|_| ())
}

fn v_ip_dhcp_pool(ctx: &CommandContext) -> Result<(), CommandError> {
    util::require_raw(ctx.input, 3, "pool name").map(|_| ())
}

/// Creates the pool on first entry. The name keeps the caller's casing.
fn enter_pool(device: &mut NetworkDevice, name: &str) -> Result<Vec<String>, CommandError> {
    if device.pool(name).is_none() {
        device.dhcp_pools.push(DhcpPool::new(
            name,
            Ipv4Addr::UNSPECIFIED,
            Ipv4Addr::UNSPECIFIED,
        ));
    }
    device.cli.enter(CliView::PoolView {
        pool: name.to_owned(),
    });
    Ok(Vec::new())
}

fn x_ip_pool(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let name = util::require_raw(input, 2, "pool name")?.to_owned();
    enter_pool(device, &name)
}

fn x_ip_dhcp_pool(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let name = util::require_raw(input, 3, "pool name")?.to_owned();
    enter_pool(device, &name)
}

fn current_pool(device: &mut NetworkDevice) -> Result<&mut DhcpPool, CommandError> {
    let name = util::view_pool(device)
        .ok_or_else(|| CommandError::precondition("No pool is selected."))?;
    device
        .pool_mut(&name)
        .ok_or_else(|| CommandError::precondition("The selected pool no longer exists."))
}

// ── network <ip> [mask <mask>] ──────────────────────────────────────

fn m_network(ctx: &CommandContext) -> bool {
    ctx.input.head_is("network")
}

fn network_args(input: &CommandInput) -> Result<(Ipv4Addr, Ipv4Addr), CommandError> {
    let addr = util::parse_ip(util::require(input, 1, "network address")?, "network address")?;
    // Huawei spells the mask keyword out; Cisco puts the mask directly
    // after the address.
    let mask_index = if input.token(2) == Some("mask") { 3 } else { 2 };
    let mask = match input.token(mask_index) {
        Some(raw) => util::parse_mask(raw)?,
        None => Ipv4Addr::new(255, 255, 255, 0),
    };
    Ok((addr, mask))
}

fn v_network(ctx: &CommandContext) -> Result<(), CommandError> {
    network_args(ctx.input).map(|_| ())
}

fn x_network(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let (addr, mask) = network_args(input)?;
    let prefix = ip::prefix_from_mask(mask).unwrap_or(24);
    let network = ip::from_u32(ip::to_u32(addr) & ip::to_u32(ip::mask_from_prefix(prefix)));
    let pool = current_pool(device)?;
    pool.network = network;
    pool.mask = mask;
    Ok(Vec::new())
}

// ── gateway-list <ip> / default-router <ip> ─────────────────────────

fn m_gateway_list(ctx: &CommandContext) -> bool {
    ctx.input.head_is("gateway-list")
}

fn m_default_router(ctx: &CommandContext) -> bool {
    ctx.input.head_is("default-router")
}

fn v_gateway(ctx: &CommandContext) -> Result<(), CommandError> {
    util::parse_ip(util::require(ctx.input, 1, "gateway address")?, "gateway address").map(|_| ())
}

fn x_gateway(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let gw = util::parse_ip(util::require(input, 1, "gateway address")?, "gateway address")?;
    current_pool(device)?.set_gateway(gw);
    Ok(Vec::new())
}

// ── dns-list / dns-server ───────────────────────────────────────────

fn m_dns_list(ctx: &CommandContext) -> bool {
    ctx.input.head_is("dns-list")
}

fn m_dns_server(ctx: &CommandContext) -> bool {
    ctx.input.head_is("dns-server")
}

fn dns_args(input: &CommandInput) -> Result<Vec<Ipv4Addr>, CommandError> {
    let args = input.args_after(1);
    if args.is_empty() {
        return Err(CommandError::MissingArgument { what: "dns address" });
    }
    args.iter()
        .map(|raw| util::parse_ip(raw, "dns address"))
        .collect()
}

fn v_dns(ctx: &CommandContext) -> Result<(), CommandError> {
    dns_args(ctx.input).map(|_| ())
}

fn x_dns(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let servers = dns_args(input)?;
    let pool = current_pool(device)?;
    for server in servers {
        if !pool.dns.contains(&server) {
            pool.dns.push(server);
        }
    }
    Ok(Vec::new())
}

// ── excluded-ip-address <ip> [<ip>] ─────────────────────────────────

fn m_excluded(ctx: &CommandContext) -> bool {
    ctx.input.head_is("excluded-ip-address")
}

const MAX_EXCLUDED_RANGE: u32 = 256;

fn excluded_args(input: &CommandInput) -> Result<Vec<Ipv4Addr>, CommandError> {
    let lo = util::parse_ip(util::require(input, 1, "excluded address")?, "excluded address")?;
    let Some(raw_hi) = input.token(2) else {
        return Ok(vec![lo]);
    };
    let hi = util::parse_ip(raw_hi, "excluded address")?;
    let (lo_u, hi_u) = (ip::to_u32(lo), ip::to_u32(hi));
    if hi_u < lo_u || hi_u - lo_u + 1 > MAX_EXCLUDED_RANGE {
        return Err(CommandError::InvalidArgument {
            what: "excluded range",
            value: format!("{lo} {hi}"),
        });
    }
    Ok((lo_u..=hi_u).map(ip::from_u32).collect())
}

fn v_excluded(ctx: &CommandContext) -> Result<(), CommandError> {
    excluded_args(ctx.input).map(|_| ())
}

fn x_excluded(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let addresses = excluded_args(input)?;
    let pool = current_pool(device)?;
    for addr in addresses {
        if !pool.excluded.contains(&addr) {
            pool.excluded.push(addr);
        }
    }
    Ok(Vec::new())
}

// ── lease ───────────────────────────────────────────────────────────

fn m_lease(ctx: &CommandContext) -> bool {
    ctx.input.head_is("lease")
}

/// `lease day <d> [hour <h>]` (Huawei) or `lease <d> [<h>]` (Cisco).
fn lease_seconds(input: &CommandInput) -> Result<u32, CommandError> {
    let (day_index, keyworded) = if input.token(1) == Some("day") {
        (2, true)
    } else {
        (1, false)
    };
    let days = util::parse_u32(util::require(input, day_index, "lease days")?, "lease days")?;
    let hour_index = if keyworded {
        if input.token(day_index + 1) == Some("hour") {
            Some(day_index + 2)
        } else {
            None
        }
    } else {
        input.token(day_index + 1).map(|_| day_index + 1)
    };
    let hours = match hour_index {
        Some(i) => util::parse_u32(util::require(input, i, "lease hours")?, "lease hours")?,
        None => 0,
    };
    if hours > 23 {
        return Err(CommandError::InvalidArgument {
            what: "lease hours",
            value: hours.to_string(),
        });
    }
    Ok(days * 86_400 + hours * 3_600)
}

fn v_lease(ctx: &CommandContext) -> Result<(), CommandError> {
    lease_seconds(ctx.input).map(|_| ())
}

fn x_lease(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let seconds = lease_seconds(input)?;
    current_pool(device)?.lease_seconds = seconds;
    Ok(Vec::new())
}

// ── static-bind ip-address <ip> mac-address <mac> ───────────────────

fn m_static_bind(ctx: &CommandContext) -> bool {
    ctx.input.head_is("static-bind")
}

fn static_bind_args(input: &CommandInput) -> Result<(Ipv4Addr, MacAddress), CommandError> {
    if input.token(1) != Some("ip-address") {
        return Err(CommandError::MissingArgument {
            what: "ip-address keyword",
        });
    }
    let addr = util::parse_ip(util::require(input, 2, "bind address")?, "bind address")?;
    if input.token(3) != Some("mac-address") {
        return Err(CommandError::MissingArgument {
            what: "mac-address keyword",
        });
    }
    let mac = MacAddress::new(util::require(input, 4, "mac address")?);
    Ok((addr, mac))
}

fn v_static_bind(ctx: &CommandContext) -> Result<(), CommandError> {
    static_bind_args(ctx.input).map(|_| ())
}

fn x_static_bind(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let (addr, mac) = static_bind_args(input)?;
    let pool = current_pool(device)?;
    pool.static_bindings.retain(|b| b.mac != mac);
    pool.static_bindings.push(StaticBinding { ip: addr, mac });
    if !pool.used_ips.contains(&addr) {
        pool.used_ips.push(addr);
    }
    Ok(Vec::new())
}

pub(super) fn install(registry: &mut CommandRegistry) {
    // "ip dhcp pool" registers before "ip pool" so the longer Cisco
    // form cannot be swallowed by the Huawei prefix.
    registry.register(CommandDescriptor {
        name: "ip dhcp pool",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::SystemView],
        matches: m_ip_dhcp_pool,
        validate: v_ip_dhcp_pool,
        execute: x_ip_dhcp_pool,
    });
    registry.register(CommandDescriptor {
        name: "ip pool",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::SystemView],
        matches: m_ip_pool,
        validate: v_ip_pool,
        execute: x_ip_pool,
    });
    registry.register(CommandDescriptor {
        name: "network (pool)",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::PoolView],
        matches: m_network,
        validate: v_network,
        execute: x_network,
    });
    registry.register(CommandDescriptor {
        name: "gateway-list",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::PoolView],
        matches: m_gateway_list,
        validate: v_gateway,
        execute: x_gateway,
    });
    registry.register(CommandDescriptor {
        name: "default-router",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::PoolView],
        matches: m_default_router,
        validate: v_gateway,
        execute: x_gateway,
    });
    registry.register(CommandDescriptor {
        name: "dns-list",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Huawei),
        required_views: &[ViewKind::PoolView],
        matches: m_dns_list,
        validate: v_dns,
        execute: x_dns,
    });
    registry.register(CommandDescriptor {
        name: "dns-server",
        aliases: &[],
        vendor: VendorAffinity::Only(Vendor::Cisco),
        required_views: &[ViewKind::PoolView],
        matches: m_dns_server,
        validate: v_dns,
        execute: x_dns,
    });
    registry.register(CommandDescriptor {
        name: "excluded-ip-address",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::PoolView],
        matches: m_excluded,
        validate: v_excluded,
        execute: x_excluded,
    });
    registry.register(CommandDescriptor {
        name: "lease",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::PoolView],
        matches: m_lease,
        validate: v_lease,
        execute: x_lease,
    });
    registry.register(CommandDescriptor {
        name: "static-bind",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[ViewKind::PoolView],
        matches: m_static_bind,
        validate: v_static_bind,
        execute: x_static_bind,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Topology;
    use pretty_assertions::assert_eq;

    fn input<'t>(line: &str, topology: &'t Topology) -> CommandInput<'t> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
        CommandInput {
            line: line.to_owned(),
            raw_tokens: line.split_whitespace().map(str::to_owned).collect(),
            tokens,
            vendor: Vendor::Huawei,
            topology,
        }
    }

    #[test]
    fn lease_accepts_both_dialect_forms() {
        let topology = Topology::default();
        assert_eq!(
            lease_seconds(&input("lease day 2 hour 12", &topology)).unwrap(),
            2 * 86_400 + 12 * 3_600
        );
        assert_eq!(
            lease_seconds(&input("lease 1 6", &topology)).unwrap(),
            86_400 + 6 * 3_600
        );
    }

    #[test]
    fn excluded_range_is_bounded() {
        let topology = Topology::default();
        let range = excluded_args(&input(
            "excluded-ip-address 10.0.0.10 10.0.0.12",
            &topology,
        ))
        .unwrap();
        assert_eq!(range.len(), 3);

        assert!(excluded_args(&input(
            "excluded-ip-address 10.0.0.0 10.0.4.0",
            &topology,
        ))
        .is_err());
    }

    #[test]
    fn network_accepts_keyworded_and_bare_mask() {
        let topology = Topology::default();
        let (addr, mask) =
            network_args(&input("network 192.168.10.0 mask 255.255.255.0", &topology)).unwrap();
        assert_eq!(addr, Ipv4Addr::new(192, 168, 10, 0));
        assert_eq!(mask, Ipv4Addr::new(255, 255, 255, 0));

        let (_, mask) =
            network_args(&input("network 10.0.0.0 255.255.0.0", &topology)).unwrap();
        assert_eq!(mask, Ipv4Addr::new(255, 255, 0, 0));
    }
}
