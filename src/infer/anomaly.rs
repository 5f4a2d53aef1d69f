//! Anomaly Detector — per (platform, event-type) inter-arrival rate
//! analysis. A frequency spike is a burst of events arriving much
//! faster than the key's recent historical cadence.

use crate::model::capability::Platform;
use crate::model::event::CorrelatedEvent;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyRecord {
    pub platform: Platform,
    pub event_type: String,
    pub ratio: f64,
    pub severity: &'static str,
    pub confidence: f64,
}

/// Detect frequency-spike anomalies across `events` using `sensitivity`
/// (0.0-1.0, the configured base) as the confidence floor.
pub fn detect_anomalies(events: &[CorrelatedEvent], sensitivity: f64) -> Vec<AnomalyRecord> {
    let mut by_key: HashMap<(Platform, String), Vec<chrono::DateTime<chrono::Utc>>> = HashMap::new();
    for event in events {
        by_key
            .entry((event.source_platform.clone(), event.event_type.clone()))
            .or_default()
            .push(event.timestamp);
    }

    let mut anomalies = Vec::new();
    for ((platform, event_type), mut timestamps) in by_key {
        if timestamps.len() < 3 {
            continue;
        }
        timestamps.sort();

        let intervals: Vec<f64> = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
            .collect();

        let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
        if mean == 0.0 {
            continue;
        }

        let variance = intervals.iter().map(|i| (i - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
        let stddev = variance.sqrt();
        if stddev <= 0.0 {
            continue;
        }

        let recent = *intervals.last().unwrap();
        if recent < mean - 2.0 * stddev {
            let ratio = mean / recent.max(0.1);
            let severity = if recent < 0.2 * mean { "high" } else { "medium" };
            let confidence = (sensitivity + 0.05).min(0.95);
            anomalies.push(AnomalyRecord {
                platform,
                event_type,
                ratio,
                severity,
                confidence,
            });
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Severity;
    use chrono::DateTime;

    fn event(platform: Platform, event_type: &str, offset_secs: i64) -> CorrelatedEvent {
        CorrelatedEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            source_platform: platform,
            event_type: event_type.to_string(),
            severity: Severity::Medium,
            timestamp: DateTime::from_timestamp(offset_secs, 0).unwrap(),
            affected_entities: vec![],
            raw_data: serde_json::Value::Null,
            tags: vec![],
            correlation_group: None,
        }
    }

    #[test]
    fn keys_with_fewer_than_three_events_are_skipped() {
        let events = vec![
            event(Platform::Meraki, "link_flap", 0),
            event(Platform::Meraki, "link_flap", 60),
        ];
        assert!(detect_anomalies(&events, 0.85).is_empty());
    }

    #[test]
    fn frequency_spike_detected_with_sign_matching_spec() {
        // Stable ~60s cadence for several intervals, then a sudden burst.
        let mut events = vec![];
        for i in 0..6 {
            events.push(event(Platform::Meraki, "link_flap", i * 60));
        }
        events.push(event(Platform::Meraki, "link_flap", 6 * 60 + 1));

        let anomalies = detect_anomalies(&events, 0.85);
        assert_eq!(anomalies.len(), 1);
        let anomaly = &anomalies[0];
        assert_eq!(anomaly.severity, "high");
        assert!(anomaly.ratio > 1.0);
        assert!(anomaly.confidence <= 0.95);
    }

    #[test]
    fn steady_cadence_produces_no_anomaly() {
        let mut events = vec![];
        for i in 0..5 {
            events.push(event(Platform::Meraki, "heartbeat", i * 30));
        }
        assert!(detect_anomalies(&events, 0.85).is_empty());
    }

    #[test]
    fn confidence_never_exceeds_spec_ceiling() {
        let mut events = vec![];
        for i in 0..6 {
            events.push(event(Platform::Ise, "auth_attempt", i * 100));
        }
        events.push(event(Platform::Ise, "auth_attempt", 6 * 100 + 1));
        for anomaly in detect_anomalies(&events, 1.0) {
            assert!(anomaly.confidence <= 0.95);
        }
    }
}
