// ── NAT translation ──
//
// Outbound rules match first-wins in stored order. A session is keyed
// by (protocol, original source endpoint) and stays stable for the
// flow's lifetime; the translated port is deterministic.

use std::net::Ipv4Addr;

use chrono::Utc;

use crate::model::{DeviceId, NatRule, NatSession, NetworkDevice, Topology};

use super::ip::Protocol;
use super::path;

/// Base of the translated port space; session N gets BASE + N.
pub const PORT_BASE: u16 = 10_000;

/// First outbound rule matching the egress interface and source
/// address, in stored order.
pub fn find_outbound_rule<'a>(
    rules: &'a [NatRule],
    egress: Option<&str>,
    src: Ipv4Addr,
) -> Option<&'a NatRule> {
    rules.iter().find(|r| {
        let scope_ok = match (&r.interface, egress) {
            (None, _) => true,
            (Some(scope), Some(iface)) => scope.eq_ignore_ascii_case(iface),
            (Some(_), None) => false,
        };
        scope_ok && r.source.contains(src)
    })
}

/// Find or create the session for a flow. Returns the session index in
/// `device.nat_sessions`, or `None` when no outbound rule covers the
/// source.
pub fn session_for(
    device: &mut NetworkDevice,
    protocol: Protocol,
    src: Ipv4Addr,
    src_port: u16,
    egress: Option<&str>,
) -> Option<usize> {
    if let Some(i) = device
        .nat_sessions
        .iter()
        .position(|s| s.key_matches(protocol, src, src_port))
    {
        return Some(i);
    }
    let rule = find_outbound_rule(&device.nat_rules, egress, src)?;
    let outside_ip = rule.translated;
    #[allow(clippy::cast_possible_truncation)]
    let outside_port = PORT_BASE.wrapping_add(device.nat_sessions.len() as u16);
    device.nat_sessions.push(NatSession {
        protocol,
        inside_ip: src,
        inside_port: src_port,
        outside_ip,
        outside_port,
        created_at: Utc::now(),
    });
    Some(device.nat_sessions.len() - 1)
}

/// Display form: `tcp 192.168.1.2:5000 -> 203.0.113.1:10000`.
pub fn render(session: &NatSession) -> String {
    format!(
        "{} {}:{} -> {}:{}",
        session.protocol,
        session.inside_ip,
        session.inside_port,
        session.outside_ip,
        session.outside_port
    )
}

/// Compose a session with path finding: the hop sequence toward `to`
/// annotated with the addressing the far side observes.
pub fn trace_translated(
    topo: &Topology,
    from: &DeviceId,
    to: &DeviceId,
    session: &NatSession,
) -> Option<Vec<String>> {
    let route = path::find_path(topo, from, to, None)?;
    let mut lines = vec![format!("translation: {}", render(session))];
    for (i, hop) in route.iter().enumerate().skip(1) {
        lines.push(format!(
            "  hop {:>2}: {} sees {}:{}",
            i, hop, session.outside_ip, session.outside_port
        ));
    }
    Some(lines)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::eval::ip::Cidr;
    use pretty_assertions::assert_eq;

    fn nat_device() -> NetworkDevice {
        let mut dev = NetworkDevice::new("R1", "R1", "huawei", "00:00:00:00:00:01");
        dev.nat_rules.push(NatRule {
            id: 1,
            interface: None,
            source: "192.168.1.0/24".parse::<Cidr>().unwrap(),
            translated: Ipv4Addr::new(203, 0, 113, 1),
        });
        dev
    }

    #[test]
    fn session_is_stable_for_a_flow() {
        let mut dev = nat_device();
        let src = Ipv4Addr::new(192, 168, 1, 2);
        let a = session_for(&mut dev, Protocol::Tcp, src, 5000, None).unwrap();
        let b = session_for(&mut dev, Protocol::Tcp, src, 5000, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(dev.nat_sessions.len(), 1);
    }

    #[test]
    fn distinct_flows_get_distinct_ports() {
        let mut dev = nat_device();
        let src = Ipv4Addr::new(192, 168, 1, 2);
        let a = session_for(&mut dev, Protocol::Tcp, src, 5000, None).unwrap();
        let b = session_for(&mut dev, Protocol::Udp, src, 5000, None).unwrap();
        assert_ne!(
            dev.nat_sessions[a].outside_port,
            dev.nat_sessions[b].outside_port
        );
    }

    #[test]
    fn unmatched_source_gets_no_session() {
        let mut dev = nat_device();
        let outside = Ipv4Addr::new(10, 9, 9, 9);
        assert!(session_for(&mut dev, Protocol::Tcp, outside, 5000, None).is_none());
        assert!(dev.nat_sessions.is_empty());
    }

    #[test]
    fn first_matching_rule_wins() {
        let mut dev = nat_device();
        dev.nat_rules.push(NatRule {
            id: 2,
            interface: None,
            source: "192.168.0.0/16".parse::<Cidr>().unwrap(),
            translated: Ipv4Addr::new(203, 0, 113, 99),
        });
        let src = Ipv4Addr::new(192, 168, 1, 2);
        let rule = find_outbound_rule(&dev.nat_rules, None, src).unwrap();
        assert_eq!(rule.id, 1);
    }

    #[test]
    fn render_shows_both_endpoints() {
        let mut dev = nat_device();
        let src = Ipv4Addr::new(192, 168, 1, 2);
        let i = session_for(&mut dev, Protocol::Tcp, src, 5000, None).unwrap();
        assert_eq!(
            render(&dev.nat_sessions[i]),
            "tcp 192.168.1.2:5000 -> 203.0.113.1:10000"
        );
    }

    #[test]
    fn translated_trace_annotates_each_forward_hop() {
        use crate::model::{Cable, Endpoint, NetworkDevice, NetworkPort};

        let mut r1 = nat_device();
        let mut p1 = NetworkPort::gigabit("0/0/1");
        p1.link_up = true;
        r1.ports.push(p1);
        let mut r2 = NetworkDevice::new("R2", "R2", "huawei", "00:00:00:00:00:02");
        let mut p2 = NetworkPort::gigabit("0/0/1");
        p2.link_up = true;
        r2.ports.push(p2);
        let topo = Topology {
            devices: vec![r1.clone(), r2],
            cables: vec![Cable::new(
                Endpoint::new("R1", "GigabitEthernet0/0/1"),
                Endpoint::new("R2", "GigabitEthernet0/0/1"),
            )],
        };

        let src = Ipv4Addr::new(192, 168, 1, 2);
        let i = session_for(&mut r1, Protocol::Tcp, src, 5000, None).unwrap();
        let lines = trace_translated(
            &topo,
            &DeviceId::new("R1"),
            &DeviceId::new("R2"),
            &r1.nat_sessions[i],
        )
        .unwrap();

        assert_eq!(lines[0], "translation: tcp 192.168.1.2:5000 -> 203.0.113.1:10000");
        assert_eq!(lines[1], "  hop  1: R2 sees 203.0.113.1:10000");
        assert_eq!(lines.len(), 2);
    }
}
