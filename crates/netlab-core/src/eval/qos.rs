// ── QoS queue selection and synthetic delay tracing ──
//
// Not real traffic shaping: the delay is a deterministic diagnostic
// approximation derived from queue weight and any configured shaping
// percentage, so learners can see the effect of their QoS commands.

use crate::model::{DeviceId, QosConfig, Topology};

use super::path;

/// Queue for a DSCP marking: explicit override first, else dscp/8.
pub fn queue_for_dscp(cfg: &QosConfig, dscp: u8) -> u8 {
    cfg.dscp_queue_map
        .get(&dscp)
        .copied()
        .unwrap_or(dscp.min(63) / 8)
}

/// Synthetic per-hop delay in microseconds.
///
/// Base cost of 1000us plus 8000us scaled down by the queue weight;
/// a configured shaper adds 100us per shaping percent.
pub fn synthetic_delay_us(cfg: &QosConfig, queue: u8) -> u32 {
    let weight = cfg.queue_weights.get(&queue).copied().unwrap_or(10).max(1);
    let mut delay = 1_000 + 8_000 / weight;
    if let Some(pct) = cfg.shaping_percent {
        delay += u32::from(pct) * 100;
    }
    delay
}

/// One hop of a QoS trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QosHop {
    pub device: DeviceId,
    pub egress_port: String,
    pub queue: u8,
    pub delay_us: u32,
}

/// Hop-by-hop trace of a DSCP-marked flow along the found path.
/// Read-only; the per-flow counters are bumped by the issuing command
/// on its own device only.
pub fn trace(
    topo: &Topology,
    from: &DeviceId,
    to: &DeviceId,
    dscp: u8,
) -> Option<Vec<QosHop>> {
    let route = path::find_path(topo, from, to, None)?;
    let mut hops = Vec::with_capacity(route.len().saturating_sub(1));
    for pair in route.windows(2) {
        let cable = topo.cable_between(&pair[0], &pair[1])?;
        let egress = cable.end_of(&pair[0])?;
        let port = topo.port_of(egress)?;
        let queue = queue_for_dscp(&port.config.qos, dscp);
        hops.push(QosHop {
            device: pair[0].clone(),
            egress_port: egress.port.clone(),
            queue,
            delay_us: synthetic_delay_us(&port.config.qos, queue),
        });
    }
    Some(hops)
}

/// Human-readable trace summary.
pub fn summary(hops: &[QosHop], dscp: u8) -> Vec<String> {
    let mut lines = vec![format!("QoS trace for DSCP {dscp}:")];
    for (i, hop) in hops.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {} via {} queue {} delay {}us",
            i + 1,
            hop.device,
            hop.egress_port,
            hop.queue,
            hop.delay_us
        ));
    }
    let total: u32 = hops.iter().map(|h| h.delay_us).sum();
    lines.push(format!("  total synthetic delay: {total}us"));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn queue_defaults_to_dscp_over_eight() {
        let cfg = QosConfig::default();
        assert_eq!(queue_for_dscp(&cfg, 0), 0);
        assert_eq!(queue_for_dscp(&cfg, 46), 5);
        assert_eq!(queue_for_dscp(&cfg, 63), 7);
    }

    #[test]
    fn explicit_mapping_overrides_default() {
        let mut cfg = QosConfig::default();
        cfg.dscp_queue_map.insert(46, 7);
        assert_eq!(queue_for_dscp(&cfg, 46), 7);
    }

    #[test]
    fn heavier_queues_see_less_delay() {
        let mut cfg = QosConfig::default();
        cfg.queue_weights.insert(5, 80);
        cfg.queue_weights.insert(1, 4);
        assert!(synthetic_delay_us(&cfg, 5) < synthetic_delay_us(&cfg, 1));
    }

    #[test]
    fn shaping_adds_deterministic_penalty() {
        let mut cfg = QosConfig::default();
        let unshaped = synthetic_delay_us(&cfg, 0);
        cfg.shaping_percent = Some(20);
        assert_eq!(synthetic_delay_us(&cfg, 0), unshaped + 2_000);
    }
}
