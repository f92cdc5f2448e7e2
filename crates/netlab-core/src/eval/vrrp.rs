// ── VRRP master election ──
//
// Highest priority wins; a priority tie is broken by router id
// compared as a string -- lexicographic on the dotted-decimal text,
// not numeric value. Deterministic and total.

use crate::model::DeviceId;

/// One election candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub device: DeviceId,
    pub priority: u8,
    pub router_id: String,
}

impl Candidate {
    pub fn new(device: impl Into<DeviceId>, priority: u8, router_id: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            priority,
            router_id: router_id.into(),
        }
    }
}

/// Elect the master. `None` only for an empty candidate set.
pub fn elect(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.router_id.cmp(&b.router_id))
    });
    ranked.first().copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn highest_priority_wins() {
        let candidates = vec![
            Candidate::new("A", 100, "1.1.1.1"),
            Candidate::new("B", 120, "1.1.1.2"),
        ];
        assert_eq!(elect(&candidates).unwrap().device, DeviceId::new("B"));
    }

    #[test]
    fn tie_broken_by_router_id_string_order() {
        let candidates = vec![
            Candidate::new("B", 110, "1.1.1.2"),
            Candidate::new("A", 120, "1.1.1.1"),
            Candidate::new("C", 120, "1.1.1.0"),
        ];
        // Priority ties at 120; "1.1.1.0" < "1.1.1.1" as strings.
        assert_eq!(elect(&candidates).unwrap().device, DeviceId::new("C"));
    }

    #[test]
    fn string_order_not_numeric_order() {
        // As strings "1.1.1.10" < "1.1.1.9", unlike numerically.
        let candidates = vec![
            Candidate::new("X", 100, "1.1.1.9"),
            Candidate::new("Y", 100, "1.1.1.10"),
        ];
        assert_eq!(elect(&candidates).unwrap().device, DeviceId::new("Y"));
    }

    #[test]
    fn election_is_deterministic_across_input_order() {
        let mut candidates = vec![
            Candidate::new("A", 120, "1.1.1.1"),
            Candidate::new("C", 120, "1.1.1.0"),
            Candidate::new("B", 110, "1.1.1.2"),
        ];
        let first = elect(&candidates).unwrap().device.clone();
        candidates.reverse();
        assert_eq!(elect(&candidates).unwrap().device, first);
    }

    #[test]
    fn empty_set_has_no_master() {
        assert!(elect(&[]).is_none());
    }
}
