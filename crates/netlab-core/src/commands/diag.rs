// ── Diagnostics: ping, tracert, context help ──
//
// These compose the evaluation library: path finding, ACL path
// evaluation, NAT session lookup, and QoS delay tracing. Cross-device
// state is read through the topology snapshot; counters are bumped on
// the issuing device only.

use std::net::Ipv4Addr;

use crate::engine::command::{CommandContext, CommandDescriptor, CommandInput, VendorAffinity};
use crate::engine::profile::VendorProfile;
use crate::engine::registry::CommandRegistry;
use crate::error::CommandError;
use crate::eval::ip::Protocol;
use crate::eval::{acl, nat, path, qos};
use crate::model::{DeviceId, Direction, NetworkDevice};

use super::util;

const PING_COUNT: usize = 5;
const TRACERT_MAX_HOPS: usize = 30;

fn source_ip(device: &NetworkDevice) -> Ipv4Addr {
    device
        .ports
        .iter()
        .find_map(|p| p.config.ip)
        .unwrap_or(Ipv4Addr::UNSPECIFIED)
}

/// The reachable far end for a destination address: the owning device
/// and the physical path toward it, when both exist.
fn resolve_route(
    device: &NetworkDevice,
    input: &CommandInput,
    dest: Ipv4Addr,
) -> Option<Vec<DeviceId>> {
    let target = input.topology.device_by_ip(dest)?;
    path::find_path(input.topology, &device.id, &target.id, None)
}

/// Per-round-trip delay in milliseconds from the QoS trace, never zero.
fn round_trip_ms(device: &NetworkDevice, input: &CommandInput, dest: Ipv4Addr) -> u32 {
    let total_us = input
        .topology
        .device_by_ip(dest)
        .and_then(|t| qos::trace(input.topology, &device.id, &t.id, 0))
        .map_or(0, |hops| hops.iter().map(|h| h.delay_us).sum());
    (total_us / 1_000).max(1)
}

// ── ping <ip> ───────────────────────────────────────────────────────

fn m_ping(ctx: &CommandContext) -> bool {
    ctx.input.head_is("ping")
}

fn v_ping(ctx: &CommandContext) -> Result<(), CommandError> {
    util::parse_ip(util::require(ctx.input, 1, "destination")?, "destination").map(|_| ())
}

fn timeout_lines(dest: Ipv4Addr) -> Vec<String> {
    let mut lines = vec![format!("  PING {dest}: 56  data bytes, press CTRL_C to break")];
    lines.extend((0..PING_COUNT).map(|_| "    Request time out".to_owned()));
    lines.extend(statistics(dest, 0));
    lines
}

fn statistics(dest: Ipv4Addr, received: usize) -> Vec<String> {
    #[allow(clippy::cast_precision_loss)]
    let loss = 100.0 * (PING_COUNT - received) as f64 / PING_COUNT as f64;
    vec![
        format!("  --- {dest} ping statistics ---"),
        format!("    {PING_COUNT} packet(s) transmitted"),
        format!("    {received} packet(s) received"),
        format!("    {loss:.2}% packet loss"),
    ]
}

fn x_ping(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let dest = util::parse_ip(util::require(input, 1, "destination")?, "destination")?;
    let src = source_ip(device);

    let Some(route) = resolve_route(device, input, dest) else {
        return Ok(timeout_lines(dest));
    };

    // The issuing device accounts the flow on its own ACL and egress
    // port; other hops are evaluated read-only.
    let pkt = acl::PacketDescriptor::icmp(Direction::Outbound, src, dest);
    if let Some(i) = acl::find_rule_match(&device.acl_rules, &pkt) {
        acl::bump_hits(&mut device.acl_rules, i);
    }
    if let Some(hop) = qos::trace(input.topology, &device.id, route.last().unwrap_or(&device.id), 0)
        .and_then(|hops| hops.into_iter().next())
    {
        if let Some(port) = device.port_mut(&hop.egress_port) {
            port.config.qos.flows_evaluated += 1;
        }
    }

    if let Some(block) = acl::evaluate_acl_path(input.topology, &route, &pkt) {
        let mut lines = timeout_lines(dest);
        lines.push(format!(
            "  Info: packet filtered by ACL {} rule {} on {}",
            block.acl_id, block.rule_id, block.device
        ));
        return Ok(lines);
    }

    nat::session_for(device, Protocol::Icmp, src, 0, None);

    let ms = round_trip_ms(device, input, dest);
    let mut lines = vec![format!("  PING {dest}: 56  data bytes, press CTRL_C to break")];
    for seq in 1..=PING_COUNT {
        lines.push(format!(
            "    Reply from {dest}: bytes=56 Sequence={seq} ttl=255 time={ms} ms"
        ));
    }
    lines.extend(statistics(dest, PING_COUNT));
    Ok(lines)
}

// ── tracert <ip> ────────────────────────────────────────────────────

fn m_tracert(ctx: &CommandContext) -> bool {
    ctx.input.head_is("tracert")
}

fn x_tracert(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let dest = util::parse_ip(util::require(input, 1, "destination")?, "destination")?;
    let mut lines = vec![format!(
        "traceroute to {dest}, max hops {TRACERT_MAX_HOPS}"
    )];

    let Some(target) = input.topology.device_by_ip(dest).map(|t| t.id.clone()) else {
        lines.push("  1  * * *".to_owned());
        return Ok(lines);
    };
    let Some(hops) = qos::trace(input.topology, &device.id, &target, 0) else {
        lines.push("  1  * * *".to_owned());
        return Ok(lines);
    };

    let mut cumulative_us = 0;
    let route: Vec<DeviceId> = hops.iter().map(|h| h.device.clone()).chain([target]).collect();
    for (i, hop) in hops.iter().enumerate() {
        cumulative_us += hop.delay_us;
        lines.push(format!(
            "  {}  {}  {} ms",
            i + 1,
            route[i + 1],
            (cumulative_us / 1_000).max(1)
        ));
    }

    // Show the translated addressing when an established NAT session
    // covers this source.
    let src = source_ip(device);
    let session = device
        .nat_sessions
        .iter()
        .find(|s| s.inside_ip == src)
        .cloned();
    if let Some(session) = session {
        if let Some(trace) = nat::trace_translated(input.topology, &device.id, &route[route.len() - 1], &session) {
            lines.extend(trace);
        }
    }
    Ok(lines)
}

// ── help / ? ────────────────────────────────────────────────────────

fn m_help(ctx: &CommandContext) -> bool {
    ctx.input.head_is("help") || ctx.input.head_is("?")
}

fn x_help(device: &mut NetworkDevice, input: &CommandInput) -> Result<Vec<String>, CommandError> {
    let profile = VendorProfile::for_vendor(input.vendor);
    Ok(profile.help_lines(device.cli.view.kind()))
}

pub(super) fn install(registry: &mut CommandRegistry) {
    registry.register(CommandDescriptor {
        name: "ping",
        aliases: &[],
        vendor: VendorAffinity::Any,
        required_views: &[],
        matches: m_ping,
        validate: v_ping,
        execute: x_ping,
    });
    registry.register(CommandDescriptor {
        name: "tracert",
        aliases: &["traceroute"],
        vendor: VendorAffinity::Any,
        required_views: &[],
        matches: m_tracert,
        validate: v_ping,
        execute: x_tracert,
    });
    registry.register(CommandDescriptor {
        name: "help",
        aliases: &["?"],
        vendor: VendorAffinity::Any,
        required_views: &[],
        matches: m_help,
        validate: util::no_validation,
        execute: x_help,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::profile::Vendor;
    use crate::model::{AclAction, AclRule, Cable, Endpoint, NetworkPort, Topology};
    use pretty_assertions::assert_eq;

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

    fn linked_pair() -> (NetworkDevice, Topology) {
        let mut r1 = NetworkDevice::new("R1", "R1", "huawei", "00:00:00:00:00:01");
        let mut p1 = NetworkPort::gigabit("0/0/1").with_ip(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(255, 255, 255, 0),
        );
        p1.link_up = true;
        r1.ports.push(p1);

        let mut r2 = NetworkDevice::new("R2", "R2", "huawei", "00:00:00:00:00:02");
        let mut p2 = NetworkPort::gigabit("0/0/1").with_ip(
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(255, 255, 255, 0),
        );
        p2.link_up = true;
        r2.ports.push(p2);

        let topology = Topology {
            devices: vec![r1.clone(), r2],
            cables: vec![Cable::new(
                Endpoint::new("R1", "GigabitEthernet0/0/1"),
                Endpoint::new("R2", "GigabitEthernet0/0/1"),
            )],
        };
        (r1, topology)
    }

    #[test]
    fn ping_reachable_neighbor_replies_five_times() {
        let (mut r1, topology) = linked_pair();
        let lines = x_ping(&mut r1, &input("ping 10.0.0.2", &topology)).unwrap();
        let replies = lines.iter().filter(|l| l.contains("Reply from")).count();
        assert_eq!(replies, PING_COUNT);
        assert!(lines.last().unwrap().contains("0.00% packet loss"));
    }

    #[test]
    fn ping_filtered_on_a_remote_hop_reports_the_blocking_rule() {
        let (mut r1, mut topology) = linked_pair();
        topology.devices[1]
            .acl_rules
            .push(AclRule::new(3001, 5, AclAction::Deny, Protocol::Icmp));

        let lines = x_ping(&mut r1, &input("ping 10.0.0.2", &topology)).unwrap();
        assert!(lines.iter().any(|l| l.contains("Request time out")));
        assert!(lines.iter().any(|l| l.contains("100.00% packet loss")));
        assert_eq!(
            lines.last().unwrap(),
            "  Info: packet filtered by ACL 3001 rule 5 on R2"
        );
    }

    #[test]
    fn ping_unknown_destination_times_out() {
        let (mut r1, topology) = linked_pair();
        let lines = x_ping(&mut r1, &input("ping 192.0.2.1", &topology)).unwrap();
        assert!(lines.iter().any(|l| l.contains("Request time out")));
        assert!(lines.last().unwrap().contains("100.00% packet loss"));
    }

    #[test]
    fn ping_bumps_flow_counter_on_own_egress_only() {
        let (mut r1, topology) = linked_pair();
        x_ping(&mut r1, &input("ping 10.0.0.2", &topology)).unwrap();
        assert_eq!(r1.ports[0].config.qos.flows_evaluated, 1);
        // The topology snapshot is untouched.
        assert_eq!(
            topology.devices[1].ports[0].config.qos.flows_evaluated,
            0
        );
    }

    #[test]
    fn tracert_lists_cumulative_hops() {
        let (mut r1, topology) = linked_pair();
        let lines = x_tracert(&mut r1, &input("tracert 10.0.0.2", &topology)).unwrap();
        assert_eq!(lines[0], "traceroute to 10.0.0.2, max hops 30");
        assert!(lines[1].starts_with("  1  R2"));
    }
}
