//! Event Ingest Buffer — a bounded, time-ordered ring of correlated
//! events fed by every bus channel. Appends are total-order per
//! publisher; snapshots taken by analytics components are immutable
//! copies so the O(n²) correlation pass never holds the buffer's lock.

use crate::model::event::CorrelatedEvent;
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 10_000;
const EVICTION_RETAIN: usize = 5_000;

pub struct IngestBuffer {
    capacity: usize,
    events: Mutex<Vec<CorrelatedEvent>>,
}

impl Default for IngestBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IngestBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Append an event. On overflow, retains only the most recent half
    /// of the buffer rather than evicting one at a time — the spec's
    /// bulk-truncation strategy, distinct from a single-oldest eviction.
    pub fn append(&self, event: CorrelatedEvent) {
        let mut events = self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        events.push(event);
        if events.len() > self.capacity {
            let drop_count = events.len() - EVICTION_RETAIN.min(events.len());
            events.drain(..drop_count);
        }
    }

    /// An immutable copy of the buffer's current contents.
    pub fn snapshot(&self) -> Vec<CorrelatedEvent> {
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::capability::Platform;
    use crate::model::event::Severity;
    use chrono::DateTime;

    fn event(id: &str, offset_secs: i64) -> CorrelatedEvent {
        CorrelatedEvent {
            event_id: id.to_string(),
            source_platform: Platform::Meraki,
            event_type: "test_event".to_string(),
            severity: Severity::Low,
            timestamp: DateTime::from_timestamp(offset_secs, 0).unwrap(),
            affected_entities: vec![],
            raw_data: serde_json::Value::Null,
            tags: vec![],
            correlation_group: None,
        }
    }

    #[test]
    fn append_and_snapshot_preserve_order() {
        let buffer = IngestBuffer::new(10);
        for i in 0..5 {
            buffer.append(event(&format!("e{i}"), i));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot[0].event_id, "e0");
        assert_eq!(snapshot[4].event_id, "e4");
    }

    #[test]
    fn overflow_retains_most_recent_half() {
        let buffer = IngestBuffer::new(10);
        for i in 0..12 {
            buffer.append(event(&format!("e{i}"), i));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 5);
        // The oldest surviving event is e7 (12 events, retain last 5: e7..e11).
        assert_eq!(snapshot[0].event_id, "e7");
        assert_eq!(snapshot[4].event_id, "e11");
    }

    #[test]
    fn default_capacity_matches_spec() {
        let buffer = IngestBuffer::default();
        assert!(buffer.is_empty());
    }
}
