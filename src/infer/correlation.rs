//! Correlation Engine — deliberately simple O(n²) greedy clustering by
//! entity overlap within a time window. Stable under equal timestamps
//! because grouping follows input order after a stable sort; seed-
//! anchored, so an event only joins a group whose seed shares an entity
//! with it (no transitive chaining through an unrelated intermediary).

use crate::model::event::{CorrelatedEvent, CorrelationGroup};

/// Group `events` into maximal entity-overlap clusters within `window_seconds`
/// of a seed event. Returns only groups of size ≥ 2.
pub fn correlate(events: &[CorrelatedEvent], window_seconds: i64) -> Vec<CorrelationGroup> {
    let mut sorted: Vec<&CorrelatedEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut grouped = vec![false; sorted.len()];
    let mut groups = Vec::new();

    for i in 0..sorted.len() {
        if grouped[i] {
            continue;
        }
        let seed = sorted[i];
        let seed_entities = seed.entities();
        let mut members = vec![i];

        for j in (i + 1)..sorted.len() {
            if grouped[j] {
                continue;
            }
            let candidate = sorted[j];
            let within_window = (candidate.timestamp - seed.timestamp).num_seconds() <= window_seconds;
            if !within_window {
                continue;
            }
            let overlaps = candidate.entities().intersection(&seed_entities).next().is_some();
            if overlaps {
                members.push(j);
            }
        }

        if members.len() < 2 {
            continue;
        }
        for &m in &members {
            grouped[m] = true;
        }

        let group_events: Vec<CorrelatedEvent> = members.iter().map(|&m| sorted[m].clone()).collect();
        let group_id = format!("corr-{}", uuid::Uuid::new_v4());
        groups.push(CorrelationGroup::from_events(group_id, group_events));
    }

    groups
}
