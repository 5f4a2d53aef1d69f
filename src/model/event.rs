use crate::model::capability::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Closed severity set with an explicit rank used by correlation, RCA,
/// and risk scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 5,
            Severity::High => 4,
            Severity::Medium => 3,
            Severity::Low => 2,
            Severity::Info => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "info" => Severity::Info,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable observed event, as published on `events:correlated`,
/// `alerts:security`, or a `telemetry:<platform>` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedEvent {
    pub event_id: String,
    pub source_platform: Platform,
    pub event_type: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub affected_entities: Vec<String>,
    #[serde(default)]
    pub raw_data: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub correlation_group: Option<String>,
}

impl CorrelatedEvent {
    pub fn entities(&self) -> HashSet<&str> {
        self.affected_entities.iter().map(String::as_str).collect()
    }
}

/// A derived, non-persisted grouping of events that pairwise share at
/// least one affected entity within a time window, anchored to a seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationGroup {
    pub group_id: String,
    pub events: Vec<CorrelatedEvent>,
    pub platforms: Vec<Platform>,
    pub max_severity: Severity,
    pub time_span_seconds: i64,
    pub affected_entities: Vec<String>,
}

impl CorrelationGroup {
    pub fn from_events(group_id: String, mut events: Vec<CorrelatedEvent>) -> Self {
        events.sort_by_key(|e| e.timestamp);

        let mut platforms: Vec<Platform> = Vec::new();
        let mut entities: HashSet<String> = HashSet::new();
        let mut max_severity = Severity::Info;

        for event in &events {
            if !platforms.contains(&event.source_platform) {
                platforms.push(event.source_platform.clone());
            }
            entities.extend(event.affected_entities.iter().cloned());
            if event.severity > max_severity {
                max_severity = event.severity;
            }
        }

        let time_span_seconds = match (events.first(), events.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_seconds(),
            _ => 0,
        };

        let mut affected_entities: Vec<String> = entities.into_iter().collect();
        affected_entities.sort();

        Self {
            group_id,
            events,
            platforms,
            max_severity,
            time_span_seconds,
            affected_entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ranks_match_spec() {
        assert_eq!(Severity::Critical.rank(), 5);
        assert_eq!(Severity::High.rank(), 4);
        assert_eq!(Severity::Medium.rank(), 3);
        assert_eq!(Severity::Low.rank(), 2);
        assert_eq!(Severity::Info.rank(), 1);
    }

    #[test]
    fn severity_ordering_follows_rank() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn group_derives_max_severity_and_entity_union() {
        let events = vec![
            sample_event("e1", Platform::ThousandEyes, Severity::Medium, &["site-a"], 0),
            sample_event("e2", Platform::Meraki, Severity::Low, &["site-a", "site-b"], 60),
        ];
        let group = CorrelationGroup::from_events("g1".into(), events);
        assert_eq!(group.max_severity, Severity::Medium);
        assert_eq!(group.platforms.len(), 2);
        assert_eq!(group.affected_entities, vec!["site-a", "site-b"]);
        assert_eq!(group.time_span_seconds, 60);
    }

    fn sample_event(
        id: &str,
        platform: Platform,
        severity: Severity,
        entities: &[&str],
        offset_secs: i64,
    ) -> CorrelatedEvent {
        CorrelatedEvent {
            event_id: id.to_string(),
            source_platform: platform,
            event_type: "test_event".to_string(),
            severity,
            timestamp: DateTime::from_timestamp(offset_secs, 0).unwrap(),
            affected_entities: entities.iter().map(|s| s.to_string()).collect(),
            raw_data: serde_json::Value::Null,
            tags: vec![],
            correlation_group: None,
        }
    }
}
