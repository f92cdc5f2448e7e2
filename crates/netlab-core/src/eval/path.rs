// ── Topology path finding ──
//
// Breadth-first search over the cable list, treating every cable as an
// undirected edge. A cable is traversable only if both endpoint ports
// are administratively up; with a VLAN context both ports must also
// permit the VLAN (routed ports bypass VLAN gating). Symmetric under
// endpoint swap, and a device never has a path to itself.

use std::collections::{HashMap, VecDeque};

use crate::model::{DeviceId, Topology};

fn traversable(topo: &Topology, cable: &crate::model::Cable, vlan: Option<u16>) -> bool {
    let (Some(pa), Some(pb)) = (topo.port_of(&cable.a), topo.port_of(&cable.b)) else {
        return false;
    };
    if !pa.admin_up || !pb.admin_up {
        return false;
    }
    match vlan {
        Some(v) => pa.permits_vlan(v) && pb.permits_vlan(v),
        None => true,
    }
}

/// Ordered device-id hop sequence from `from` to `to`, inclusive of
/// both endpoints, or `None` when unreachable. `vlan` scopes
/// reachability to ports carrying that VLAN.
pub fn find_path(
    topo: &Topology,
    from: &DeviceId,
    to: &DeviceId,
    vlan: Option<u16>,
) -> Option<Vec<DeviceId>> {
    if from == to {
        return None;
    }
    topo.device(from)?;
    topo.device(to)?;

    let mut prev: HashMap<DeviceId, DeviceId> = HashMap::new();
    let mut queue = VecDeque::from([from.clone()]);

    while let Some(current) = queue.pop_front() {
        for cable in topo.cables_of(&current) {
            if !traversable(topo, cable, vlan) {
                continue;
            }
            let Some(next) = cable.other_end(&current) else {
                continue;
            };
            if next.device == *from || prev.contains_key(&next.device) {
                continue;
            }
            prev.insert(next.device.clone(), current.clone());
            if next.device == *to {
                let mut path = vec![to.clone()];
                let mut cursor = to;
                while let Some(p) = prev.get(cursor) {
                    path.push(p.clone());
                    cursor = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next.device.clone());
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Cable, Endpoint, NetworkDevice, NetworkPort};
    use pretty_assertions::assert_eq;

    fn device(id: &str, ports: &[&str]) -> NetworkDevice {
        let mut dev = NetworkDevice::new(id, id, "huawei", "00:00:00:00:00:01");
        for p in ports {
            dev.ports.push(NetworkPort::gigabit(*p));
        }
        dev
    }

    fn cable(a: (&str, &str), b: (&str, &str)) -> Cable {
        Cable::new(
            Endpoint::new(a.0, format!("GigabitEthernet{}", a.1)),
            Endpoint::new(b.0, format!("GigabitEthernet{}", b.1)),
        )
    }

    /// A -- B -- C chain.
    fn chain() -> Topology {
        Topology {
            devices: vec![
                device("A", &["0/0/1"]),
                device("B", &["0/0/1", "0/0/2"]),
                device("C", &["0/0/1"]),
            ],
            cables: vec![
                cable(("A", "0/0/1"), ("B", "0/0/1")),
                cable(("B", "0/0/2"), ("C", "0/0/1")),
            ],
        }
    }

    #[test]
    fn finds_multi_hop_path() {
        let topo = chain();
        let path = find_path(&topo, &"A".into(), &"C".into(), None).unwrap();
        let ids: Vec<_> = path.iter().map(DeviceId::as_str).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn symmetric_under_endpoint_swap() {
        let topo = chain();
        let forward = find_path(&topo, &"A".into(), &"C".into(), None).is_some();
        let backward = find_path(&topo, &"C".into(), &"A".into(), None).is_some();
        assert_eq!(forward, backward);
    }

    #[test]
    fn no_path_to_self() {
        let topo = chain();
        assert!(find_path(&topo, &"A".into(), &"A".into(), None).is_none());
    }

    #[test]
    fn admin_down_port_blocks_the_cable() {
        let mut topo = chain();
        topo.devices[1].port_mut("GigabitEthernet0/0/2").unwrap().admin_up = false;
        assert!(find_path(&topo, &"A".into(), &"C".into(), None).is_none());
        assert!(find_path(&topo, &"C".into(), &"A".into(), None).is_none());
    }

    #[test]
    fn vlan_gating_on_access_ports() {
        let mut topo = chain();
        for dev in &mut topo.devices {
            dev.vlans.insert(10);
            for port in &mut dev.ports {
                port.config.access_vlan = 10;
            }
        }
        assert!(find_path(&topo, &"A".into(), &"C".into(), Some(10)).is_some());
        assert!(find_path(&topo, &"A".into(), &"C".into(), Some(20)).is_none());
    }

    #[test]
    fn routed_ports_bypass_vlan_gating() {
        let mut topo = chain();
        for dev in &mut topo.devices {
            for port in &mut dev.ports {
                port.config.mode = crate::model::LinkMode::Routed;
            }
        }
        assert!(find_path(&topo, &"A".into(), &"C".into(), Some(999)).is_some());
    }
}
