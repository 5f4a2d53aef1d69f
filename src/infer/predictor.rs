//! Predictor — cascading-failure and complex-incident heuristics over
//! a lookback window of recent events. The historical-incident list is
//! accepted for future pattern matching but ignored in this version.

use crate::model::capability::Platform;
use crate::model::event::CorrelatedEvent;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub kind: &'static str,
    pub risk_level: &'static str,
    pub confidence: f64,
    pub time_horizon_minutes: u32,
    pub preemptive_actions: Vec<&'static str>,
    pub platform: Option<Platform>,
}

/// Run both predictor heuristics over `events`. `_incident_history` is
/// accepted for forward compatibility and currently unused.
pub fn predict(events: &[CorrelatedEvent], _incident_history: &[()]) -> Vec<Prediction> {
    let mut predictions = Vec::new();
    predictions.extend(cascading_failure(events));
    if let Some(prediction) = complex_incident(events) {
        predictions.push(prediction);
    }
    predictions
}

fn cascading_failure(events: &[CorrelatedEvent]) -> Vec<Prediction> {
    let mut counts: HashMap<Platform, usize> = HashMap::new();
    for event in events {
        if event.severity.rank() >= 4 {
            *counts.entry(event.source_platform.clone()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= 3)
        .map(|(platform, count)| Prediction {
            kind: "cascading_failure",
            risk_level: "high",
            confidence: (0.6 + 0.1 * count as f64).min(0.9),
            time_horizon_minutes: 30,
            preemptive_actions: vec![
                "Notify the on-call owner for the affected platform",
                "Pre-stage a rollback of the most recent change on that platform",
                "Increase monitoring sample rate for the affected platform",
            ],
            platform: Some(platform),
        })
        .collect()
}

fn complex_incident(events: &[CorrelatedEvent]) -> Option<Prediction> {
    let platforms: HashSet<&Platform> = events.iter().map(|e| &e.source_platform).collect();
    let has_elevated = events.iter().any(|e| e.severity.rank() >= 3);

    if platforms.len() >= 3 && has_elevated {
        let risk_level = if platforms.len() >= 4 { "critical" } else { "high" };
        Some(Prediction {
            kind: "complex_incident",
            risk_level,
            confidence: 0.70,
            time_horizon_minutes: 15,
            preemptive_actions: vec![
                "Stand up a cross-platform incident bridge",
                "Pull the last hour of correlated events for every involved platform",
                "Assign a single incident commander before root-causing further",
            ],
            platform: None,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Severity;
    use chrono::DateTime;

    fn event(platform: Platform, severity: Severity, offset: i64) -> CorrelatedEvent {
        CorrelatedEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            source_platform: platform,
            event_type: "fault".to_string(),
            severity,
            timestamp: DateTime::from_timestamp(offset, 0).unwrap(),
            affected_entities: vec![],
            raw_data: serde_json::Value::Null,
            tags: vec![],
            correlation_group: None,
        }
    }

    #[test]
    fn cascading_failure_prediction_matches_confidence_formula() {
        let events = vec![
            event(Platform::Meraki, Severity::High, 0),
            event(Platform::Meraki, Severity::Critical, 10),
            event(Platform::Meraki, Severity::High, 20),
        ];
        let predictions = predict(&events, &[]);
        let cascading = predictions.iter().find(|p| p.kind == "cascading_failure").unwrap();
        assert_eq!(cascading.risk_level, "high");
        assert!((cascading.confidence - 0.9).abs() < 1e-9);
        assert_eq!(cascading.time_horizon_minutes, 30);
    }

    #[test]
    fn complex_incident_is_critical_at_four_platforms() {
        let events = vec![
            event(Platform::Meraki, Severity::Medium, 0),
            event(Platform::Panorama, Severity::Medium, 1),
            event(Platform::Ise, Severity::Medium, 2),
            event(Platform::ThousandEyes, Severity::High, 3),
        ];
        let predictions = predict(&events, &[]);
        let complex = predictions.iter().find(|p| p.kind == "complex_incident").unwrap();
        assert_eq!(complex.risk_level, "critical");
        assert_eq!(complex.confidence, 0.70);
    }

    #[test]
    fn complex_incident_is_high_at_three_platforms() {
        let events = vec![
            event(Platform::Meraki, Severity::Medium, 0),
            event(Platform::Panorama, Severity::Medium, 1),
            event(Platform::Ise, Severity::High, 2),
        ];
        let predictions = predict(&events, &[]);
        let complex = predictions.iter().find(|p| p.kind == "complex_incident").unwrap();
        assert_eq!(complex.risk_level, "high");
    }

    #[test]
    fn no_predictions_below_thresholds() {
        let events = vec![event(Platform::Meraki, Severity::Low, 0)];
        assert!(predict(&events, &[]).is_empty());
    }
}
