// ── STP table formatting ──
//
// Presentational only: renders each port's stored role/status/counters.
// The roles themselves are populated by the out-of-scope topology
// simulation; this module computes no convergence.

use crate::model::{NetworkDevice, StpRole, StpStatus};

pub const BRIEF_HEADER: &str = " MSTID  Port                        Role  STP State     Protection";

fn role_code(role: StpRole) -> &'static str {
    match role {
        StpRole::Designated => "DESI",
        StpRole::Root => "ROOT",
        StpRole::Alternate => "ALTE",
        StpRole::Backup => "BACK",
        StpRole::Disabled => "DISA",
    }
}

fn status_text(status: StpStatus) -> &'static str {
    match status {
        StpStatus::Forwarding => "FORWARDING",
        StpStatus::Learning => "LEARNING",
        StpStatus::Discarding => "DISCARDING",
        StpStatus::Disabled => "DISABLED",
    }
}

fn protection_text(bpdu_guard: bool, root_protection: bool) -> &'static str {
    match (root_protection, bpdu_guard) {
        (true, _) => "ROOT",
        (false, true) => "BPDU",
        (false, false) => "NONE",
    }
}

/// The fixed-width `display stp brief` table.
pub fn format_brief(device: &NetworkDevice) -> Vec<String> {
    let mut lines = vec![BRIEF_HEADER.to_owned()];
    for port in &device.ports {
        lines.push(format!(
            "   0    {:<26}  {:<4}  {:<12}  {}",
            port.id,
            role_code(port.stp.role),
            status_text(port.stp.status),
            protection_text(port.config.bpdu_guard, port.config.root_protection)
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NetworkPort, StpPortState};
    use pretty_assertions::assert_eq;

    #[test]
    fn brief_table_is_column_aligned() {
        let mut dev = NetworkDevice::new("sw1", "SW1", "huawei", "00:00:00:00:00:02");
        dev.ports.push(NetworkPort::gigabit("0/0/1"));
        let mut blocked = NetworkPort::gigabit("0/0/2");
        blocked.stp = StpPortState {
            role: StpRole::Alternate,
            status: StpStatus::Discarding,
            tx_bpdu: 4,
            rx_bpdu: 9,
        };
        blocked.config.bpdu_guard = true;
        dev.ports.push(blocked);

        let lines = format_brief(&dev);
        assert_eq!(lines[0], BRIEF_HEADER);
        assert_eq!(
            lines[1],
            "   0    GigabitEthernet0/0/1        DESI  FORWARDING    NONE"
        );
        assert_eq!(
            lines[2],
            "   0    GigabitEthernet0/0/2        ALTE  DISCARDING    BPDU"
        );
    }
}
