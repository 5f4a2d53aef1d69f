//! Risk Scorer — a weighted composite over the last hour of events plus
//! current anomaly and prediction outputs, capped at 100 and mapped to
//! a four-tier label.

use crate::infer::anomaly::AnomalyRecord;
use crate::infer::predictor::Prediction;
use crate::model::event::{CorrelatedEvent, Severity};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    pub score: u32,
    pub tier: &'static str,
}

fn event_weight(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 15,
        Severity::High => 8,
        Severity::Medium => 3,
        Severity::Low => 1,
        Severity::Info => 0,
    }
}

fn prediction_weight(risk_level: &str) -> u32 {
    match risk_level {
        "critical" => 15,
        "high" => 8,
        _ => 0,
    }
}

fn tier_for(score: u32) -> &'static str {
    match score {
        0..=25 => "LOW",
        26..=50 => "MODERATE",
        51..=75 => "ELEVATED",
        _ => "CRITICAL",
    }
}

/// Compose a risk score from the last hour's `events` plus the current
/// `anomalies` and `predictions` batches.
pub fn score(events: &[CorrelatedEvent], anomalies: &[AnomalyRecord], predictions: &[Prediction]) -> RiskScore {
    let event_component: u32 = events
        .iter()
        .map(|e| event_weight(e.severity))
        .sum::<u32>()
        .min(60);

    let high_confidence_anomalies = anomalies.iter().filter(|a| a.confidence >= 0.7).count();
    let anomaly_component = (5 * high_confidence_anomalies as u32).min(20);

    let prediction_component: u32 = predictions
        .iter()
        .map(|p| prediction_weight(p.risk_level))
        .sum::<u32>()
        .min(20);

    let total = (event_component + anomaly_component + prediction_component).min(100);

    RiskScore {
        score: total,
        tier: tier_for(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::capability::Platform;
    use chrono::DateTime;

    fn event(severity: Severity) -> CorrelatedEvent {
        CorrelatedEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            source_platform: Platform::Meraki,
            event_type: "fault".to_string(),
            severity,
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            affected_entities: vec![],
            raw_data: serde_json::Value::Null,
            tags: vec![],
            correlation_group: None,
        }
    }

    #[test]
    fn empty_inputs_score_zero_and_tier_low() {
        let result = score(&[], &[], &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, "LOW");
    }

    #[test]
    fn event_component_is_capped_at_sixty() {
        let events: Vec<CorrelatedEvent> = (0..10).map(|_| event(Severity::Critical)).collect();
        let result = score(&events, &[], &[]);
        assert_eq!(result.score, 60);
        assert_eq!(result.tier, "ELEVATED");
    }

    #[test]
    fn total_never_exceeds_one_hundred() {
        let events: Vec<CorrelatedEvent> = (0..10).map(|_| event(Severity::Critical)).collect();
        let anomalies = vec![
            AnomalyRecord { platform: Platform::Meraki, event_type: "x".into(), ratio: 5.0, severity: "high", confidence: 0.9 };
            5
        ];
        let predictions = vec![
            Prediction { kind: "complex_incident", risk_level: "critical", confidence: 0.7, time_horizon_minutes: 15, preemptive_actions: vec![], platform: None },
            Prediction { kind: "cascading_failure", risk_level: "critical", confidence: 0.9, time_horizon_minutes: 30, preemptive_actions: vec![], platform: None },
        ];
        let result = score(&events, &anomalies, &predictions);
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, "CRITICAL");
    }

    #[test]
    fn low_confidence_anomalies_are_excluded() {
        let anomalies = vec![AnomalyRecord {
            platform: Platform::Meraki,
            event_type: "x".into(),
            ratio: 2.0,
            severity: "medium",
            confidence: 0.5,
        }];
        let result = score(&[], &anomalies, &[]);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn tier_boundaries_match_spec() {
        assert_eq!(tier_for(25), "LOW");
        assert_eq!(tier_for(26), "MODERATE");
        assert_eq!(tier_for(50), "MODERATE");
        assert_eq!(tier_for(51), "ELEVATED");
        assert_eq!(tier_for(75), "ELEVATED");
        assert_eq!(tier_for(76), "CRITICAL");
    }
}
