// End-to-end dispatch behavior through the public API: one executor,
// one device, a read-only topology snapshot.

#![allow(clippy::unwrap_used)]

use std::net::Ipv4Addr;

use pretty_assertions::assert_eq;

use netlab_core::engine::{CommandExecutor, CommandRegistry, Vendor};
use netlab_core::model::{CliView, LinkMode, NetworkDevice, Topology, ViewKind};
use netlab_core::CommandError;

fn executor() -> CommandExecutor {
    CommandExecutor::new(CommandRegistry::with_builtins())
}

fn huawei_router() -> NetworkDevice {
    NetworkDevice::new("r1", "R1", "huawei", "00:11:22:33:44:01")
        .with_port(netlab_core::model::NetworkPort::gigabit("0/0/1"))
        .with_port(netlab_core::model::NetworkPort::gigabit("0/0/2"))
}

fn run(exec: &CommandExecutor, device: &mut NetworkDevice, topo: &Topology, lines: &[&str]) {
    for line in lines {
        let dispatch = exec.dispatch(line, device, topo);
        assert!(
            dispatch.succeeded(),
            "line {line:?} failed: {:?}",
            dispatch.error
        );
    }
}

#[test]
fn scripted_session_builds_running_config() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();

    run(
        &exec,
        &mut dev,
        &topo,
        &[
            "sys",
            "sysname Core1",
            "vlan 10",
            "interface GigabitEthernet 0/0/1",
            "port link-type access",
            "port default vlan 10",
            "quit",
            "acl 3001",
            "rule 5 deny tcp source 10.0.0.0/24 destination any",
            "quit",
            "bgp 65001",
            "peer 10.0.0.2 as-number 65002",
            "quit",
            "ip pool lan",
            "network 192.168.10.0 mask 255.255.255.0",
            "gateway-list 192.168.10.1",
            "quit",
            "quit",
        ],
    );

    assert_eq!(dev.hostname, "Core1");
    assert!(dev.vlans.contains(&10));
    let port = dev.port("GigabitEthernet0/0/1").unwrap();
    assert_eq!(port.config.mode, LinkMode::Access);
    assert_eq!(port.config.access_vlan, 10);
    assert_eq!(dev.acl_rules.len(), 1);
    assert_eq!(dev.bgp.as_ref().unwrap().neighbors.len(), 1);
    let pool = dev.pool("lan").unwrap();
    assert_eq!(pool.gateway, Some(Ipv4Addr::new(192, 168, 10, 1)));
    assert_eq!(dev.cli.view, CliView::UserView);
}

#[test]
fn cisco_dialect_reaches_the_same_state() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = NetworkDevice::new("s1", "SW1", "cisco", "00:11:22:33:44:02")
        .with_port(netlab_core::model::NetworkPort::gigabit("0/0/1"));

    run(
        &exec,
        &mut dev,
        &topo,
        &[
            "enable",
            "conf t",
            "hostname Edge1",
            "vlan 20",
            "int GigabitEthernet 0/0/1",
            "switchport mode access",
            "switchport access vlan 20",
            "no shut",
            "end",
        ],
    );

    assert!(dev.cli.privileged);
    assert_eq!(dev.hostname, "Edge1");
    let port = dev.port("GigabitEthernet0/0/1").unwrap();
    assert_eq!(port.config.access_vlan, 20);
    assert!(port.admin_up);
    assert_eq!(dev.cli.view, CliView::UserView);
}

#[test]
fn dispatch_is_deterministic_with_an_unchanged_registry() {
    let exec = executor();
    let topo = Topology::default();

    let outputs: Vec<Vec<String>> = (0..3)
        .map(|_| {
            let mut dev = huawei_router();
            let mut all = Vec::new();
            for line in ["sys", "vlan 10", "display vlan"] {
                all.extend(exec.dispatch(line, &mut dev, &topo).output);
            }
            all
        })
        .collect();

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
}

#[test]
fn unknown_command_appends_error_and_mutates_nothing() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();
    exec.dispatch("sys", &mut dev, &topo);
    let before = (dev.hostname.clone(), dev.vlans.clone(), dev.cli.clone());
    let console_len = dev.console.len();

    let dispatch = exec.dispatch("frobnicate now", &mut dev, &topo);
    assert!(matches!(
        dispatch.error,
        Some(CommandError::UnknownCommand { .. })
    ));
    assert_eq!(
        dispatch.output,
        vec!["Error: Unrecognized command found at '^' position.".to_owned()]
    );
    assert!(dispatch.usage.is_none());
    // Echo plus the error line and nothing else.
    assert_eq!(dev.console.len(), console_len + 2);
    assert_eq!(before, (dev.hostname.clone(), dev.vlans.clone(), dev.cli.clone()));
}

#[test]
fn validate_failures_leave_the_device_untouched() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();
    exec.dispatch("sys", &mut dev, &topo);
    let vlans = dev.vlans.clone();

    // Repeated invalid dispatches must not accumulate any state.
    for _ in 0..5 {
        let dispatch = exec.dispatch("vlan 4095", &mut dev, &topo);
        assert!(matches!(
            dispatch.error,
            Some(CommandError::InvalidArgument { .. })
        ));
    }
    assert_eq!(dev.vlans, vlans);
}

#[test]
fn view_gating_rejects_bgp_commands_outside_bgp_view() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();
    exec.dispatch("sys", &mut dev, &topo);

    let dispatch = exec.dispatch("peer 10.0.0.2 as-number 65002", &mut dev, &topo);
    assert!(matches!(
        dispatch.error,
        Some(CommandError::WrongView {
            required: ViewKind::BgpView,
            actual: ViewKind::SystemView,
        })
    ));
    assert!(dev.bgp.is_none());
}

#[test]
fn network_resolves_per_view() {
    // `network` exists in both the bgp and pool views; the registry
    // must pick whichever is legal in the active view.
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();

    run(
        &exec,
        &mut dev,
        &topo,
        &[
            "sys",
            "bgp 65001",
            "network 10.1.0.0 255.255.0.0",
            "quit",
            "ip pool lan",
            "network 192.168.10.0 mask 255.255.255.0",
        ],
    );

    assert_eq!(dev.bgp.as_ref().unwrap().networks.len(), 1);
    let pool = dev.pool("lan").unwrap();
    assert_eq!(pool.network, Ipv4Addr::new(192, 168, 10, 0));
}

#[test]
fn execution_precondition_surfaces_as_error() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();

    // Manually force a bgp view without config to hit the runtime
    // precondition path.
    dev.cli.enter(CliView::BgpView { as_number: 65001 });
    let dispatch = exec.dispatch("router-id 1.1.1.1", &mut dev, &topo);
    assert!(matches!(
        dispatch.error,
        Some(CommandError::Precondition { .. })
    ));
    assert!(dispatch.output[0].starts_with("Error: "));
}

#[test]
fn vendor_override_forces_dialect() {
    let exec = CommandExecutor::new(CommandRegistry::with_builtins()).with_vendor(Vendor::Cisco);
    let topo = Topology::default();
    let mut dev = huawei_router();

    let dispatch = exec.dispatch("frobnicate", &mut dev, &topo);
    assert_eq!(
        dispatch.output,
        vec!["% Invalid input detected at '^' marker.".to_owned()]
    );
}

#[test]
fn alias_spelling_reaches_the_canonical_command() {
    // "no rule" is an alias of "undo rule"; the Cisco dialect never
    // types the undo form.
    let exec = CommandExecutor::new(CommandRegistry::with_builtins()).with_vendor(Vendor::Cisco);
    let topo = Topology::default();
    let mut dev = NetworkDevice::new("s1", "SW1", "cisco", "00:11:22:33:44:03");

    run(
        &exec,
        &mut dev,
        &topo,
        &[
            "enable",
            "conf t",
            "acl 3001",
            "rule 5 deny tcp source 10.0.0.0/24 destination any",
            "no rule 5",
        ],
    );

    assert!(dev.acl_rules.is_empty());
}

#[test]
fn usage_records_are_emitted_on_success_only() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();

    let ok = exec.dispatch("system-view", &mut dev, &topo);
    assert_eq!(ok.usage.as_ref().unwrap().command, "system-view");

    let err = exec.dispatch("vlan 4095", &mut dev, &topo);
    assert!(err.usage.is_none());
}

#[test]
fn console_echoes_the_prompt_and_line() {
    let exec = executor();
    let topo = Topology::default();
    let mut dev = huawei_router();

    exec.dispatch("system-view", &mut dev, &topo);
    let texts: Vec<&str> = dev.console.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts[0], "<R1>system-view");
    assert_eq!(texts[1], "Enter system view, return user view with Ctrl+Z.");

    exec.dispatch("display this", &mut dev, &topo);
    assert!(dev
        .console
        .iter()
        .any(|l| l.text == "[R1]display this"));
}
