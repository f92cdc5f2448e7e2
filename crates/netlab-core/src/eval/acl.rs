// ── ACL evaluation ──
//
// First-match-wins over the stored rule order. When nothing matches,
// traffic falls through to the default policy: permit. A sandbox device
// with no ACL configured must pass traffic, and an empty rule list and
// an unconfigured one walk identically.

use std::net::Ipv4Addr;

use crate::model::{AclAction, AclRule, DeviceId, Direction, Topology};

use super::ip::Protocol;

/// The packet tuple the matcher evaluates rules against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketDescriptor {
    pub direction: Direction,
    /// Interface the packet crosses, if known.
    pub interface: Option<String>,
    pub protocol: Protocol,
    pub src: Ipv4Addr,
    pub src_port: u16,
    pub dst: Ipv4Addr,
    pub dst_port: u16,
}

impl PacketDescriptor {
    pub fn icmp(direction: Direction, src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        Self {
            direction,
            interface: None,
            protocol: Protocol::Icmp,
            src,
            src_port: 0,
            dst,
            dst_port: 0,
        }
    }
}

/// Policy applied when no rule matches.
pub const DEFAULT_ACTION: AclAction = AclAction::Permit;

fn rule_matches(rule: &AclRule, pkt: &PacketDescriptor) -> bool {
    if let Some(dir) = rule.direction {
        if dir != pkt.direction {
            return false;
        }
    }
    if let (Some(scope), Some(iface)) = (&rule.interface, &pkt.interface) {
        if !scope.eq_ignore_ascii_case(iface) {
            return false;
        }
    } else if rule.interface.is_some() && pkt.interface.is_none() {
        return false;
    }
    rule.protocol.matches(pkt.protocol)
        && rule.src.contains(pkt.src)
        && rule.dst.contains(pkt.dst)
        && rule.src_port.matches(pkt.src_port)
        && rule.dst_port.matches(pkt.dst_port)
}

/// Index of the first rule, in stored order, matching the packet.
pub fn find_rule_match(rules: &[AclRule], pkt: &PacketDescriptor) -> Option<usize> {
    rules.iter().position(|r| rule_matches(r, pkt))
}

/// Resulting action without touching hit counters.
pub fn evaluate(rules: &[AclRule], pkt: &PacketDescriptor) -> AclAction {
    find_rule_match(rules, pkt)
        .map(|i| rules[i].action)
        .unwrap_or(DEFAULT_ACTION)
}

/// Increment only the matched rule's counter. Monotonic, never reset.
pub fn bump_hits(rules: &mut [AclRule], index: usize) {
    if let Some(rule) = rules.get_mut(index) {
        rule.hits = rule.hits.saturating_add(1);
    }
}

/// Where a multi-hop path is blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBlock {
    pub device: DeviceId,
    pub acl_id: u32,
    pub rule_id: u32,
}

/// Walk a candidate hop sequence and return the first blocking (deny)
/// rule encountered, if any. Read-only: other devices are never
/// mutated, so hit counters are not bumped here.
pub fn evaluate_acl_path(
    topo: &Topology,
    path: &[DeviceId],
    pkt: &PacketDescriptor,
) -> Option<PathBlock> {
    for hop in path {
        let device = topo.device(hop)?;
        if let Some(i) = find_rule_match(&device.acl_rules, pkt) {
            let rule = &device.acl_rules[i];
            if rule.action == AclAction::Deny {
                return Some(PathBlock {
                    device: hop.clone(),
                    acl_id: rule.acl_id,
                    rule_id: rule.rule_id,
                });
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::eval::ip::PortMatch;
    use pretty_assertions::assert_eq;

    fn web_packet() -> PacketDescriptor {
        PacketDescriptor {
            direction: Direction::Inbound,
            interface: None,
            protocol: Protocol::Tcp,
            src: Ipv4Addr::new(10, 0, 0, 5),
            src_port: 40000,
            dst: Ipv4Addr::new(10, 0, 1, 10),
            dst_port: 80,
        }
    }

    #[test]
    fn first_matching_rule_wins_and_only_it_counts() {
        let mut rules = vec![
            AclRule::new(3001, 5, AclAction::Deny, Protocol::Tcp)
                .with_src("10.0.0.0/24".parse().unwrap()),
            AclRule::new(3001, 10, AclAction::Permit, Protocol::Tcp)
                .with_src("10.0.0.0/24".parse().unwrap()),
        ];
        let pkt = web_packet();

        let idx = find_rule_match(&rules, &pkt).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(evaluate(&rules, &pkt), AclAction::Deny);

        bump_hits(&mut rules, idx);
        assert_eq!(rules[0].hits, 1);
        assert_eq!(rules[1].hits, 0);
    }

    #[test]
    fn no_match_falls_through_to_permit() {
        let rules = vec![AclRule::new(3001, 5, AclAction::Deny, Protocol::Udp)];
        assert_eq!(evaluate(&rules, &web_packet()), AclAction::Permit);
        assert_eq!(evaluate(&[], &web_packet()), AclAction::Permit);
    }

    #[test]
    fn port_and_cidr_dimensions_must_all_match() {
        let rule = AclRule::new(3001, 5, AclAction::Deny, Protocol::Tcp)
            .with_src("10.0.0.0/24".parse().unwrap())
            .with_dst_port(PortMatch::Eq(443));
        assert!(find_rule_match(std::slice::from_ref(&rule), &web_packet()).is_none());

        let rule = rule.with_dst_port(PortMatch::Range(79, 81));
        assert_eq!(find_rule_match(&[rule], &web_packet()), Some(0));
    }

    #[test]
    fn interface_scoped_rule_skips_unscoped_packets() {
        let mut rule = AclRule::new(3001, 5, AclAction::Deny, Protocol::Tcp);
        rule.interface = Some("GigabitEthernet0/0/1".into());
        assert!(find_rule_match(std::slice::from_ref(&rule), &web_packet()).is_none());

        let mut pkt = web_packet();
        pkt.interface = Some("gigabitethernet0/0/1".into());
        assert_eq!(find_rule_match(&[rule], &pkt), Some(0));
    }

    #[test]
    fn direction_filter_applies() {
        let mut rule = AclRule::new(3001, 5, AclAction::Deny, Protocol::Tcp);
        rule.direction = Some(Direction::Outbound);
        assert!(find_rule_match(std::slice::from_ref(&rule), &web_packet()).is_none());
    }

    fn three_hop_route() -> (Topology, Vec<DeviceId>) {
        use crate::model::NetworkDevice;
        let topo = Topology {
            devices: vec![
                NetworkDevice::new("R1", "R1", "huawei", "00:00:00:00:00:01"),
                NetworkDevice::new("R2", "R2", "huawei", "00:00:00:00:00:02"),
                NetworkDevice::new("R3", "R3", "huawei", "00:00:00:00:00:03"),
            ],
            cables: Vec::new(),
        };
        let route = vec![
            DeviceId::new("R1"),
            DeviceId::new("R2"),
            DeviceId::new("R3"),
        ];
        (topo, route)
    }

    #[test]
    fn path_walk_reports_the_first_deny_hop() {
        let (mut topo, route) = three_hop_route();
        topo.devices[1].acl_rules.push(
            AclRule::new(3001, 5, AclAction::Deny, Protocol::Tcp)
                .with_src("10.0.0.0/24".parse().unwrap()),
        );
        topo.devices[2]
            .acl_rules
            .push(AclRule::new(3999, 1, AclAction::Deny, Protocol::Tcp));

        let block = evaluate_acl_path(&topo, &route, &web_packet()).unwrap();
        assert_eq!(
            block,
            PathBlock {
                device: DeviceId::new("R2"),
                acl_id: 3001,
                rule_id: 5,
            }
        );
    }

    #[test]
    fn permitting_hops_do_not_mask_a_later_deny() {
        let (mut topo, route) = three_hop_route();
        topo.devices[1]
            .acl_rules
            .push(AclRule::new(3001, 5, AclAction::Permit, Protocol::Tcp));
        topo.devices[2]
            .acl_rules
            .push(AclRule::new(3999, 1, AclAction::Deny, Protocol::Tcp));

        let block = evaluate_acl_path(&topo, &route, &web_packet()).unwrap();
        assert_eq!(block.device, DeviceId::new("R3"));
        assert_eq!(block.rule_id, 1);
    }

    #[test]
    fn unmatched_path_is_not_blocked() {
        let (topo, route) = three_hop_route();
        assert!(evaluate_acl_path(&topo, &route, &web_packet()).is_none());
    }
}
