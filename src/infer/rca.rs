//! RCA Matcher — a declarative template catalog matched against
//! correlation groups. Template evaluation is catalog order; the first
//! full match wins, matching the spec's stable-ordering contract.
//!
//! The catalog itself is data, not code: `load_catalog` reads it from
//! the file at `Config::rca_templates_path` (JSON or TOML, by
//! extension) so operators can add templates without a rebuild,
//! falling back to `default_catalog()` when no path is configured or
//! the resource fails to load.

use crate::model::capability::Platform;
use crate::model::event::{CorrelationGroup, Severity};
use serde::Deserialize;
use tracing::warn;

/// One required signal within a template's signal pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct Signal {
    pub platform: Platform,
    pub event_type: String,
    pub min_severity: Severity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcaTemplate {
    pub template_id: String,
    pub name: String,
    pub description: String,
    pub signal_pattern: Vec<Signal>,
    pub root_cause: String,
    pub recommended_actions: Vec<String>,
}

pub struct RcaMatch {
    pub template_id: String,
    pub name: String,
    pub root_cause: String,
    pub recommended_actions: Vec<String>,
    pub confidence: f64,
    pub matched_signal_count: usize,
}

fn signal(platform: Platform, event_type: &str, min_severity: Severity) -> Signal {
    Signal { platform, event_type: event_type.to_string(), min_severity }
}

/// The built-in catalog, used when no `rca_templates_path` is
/// configured or the configured resource fails to load. Catalog order
/// is evaluation order; the first full match wins.
pub fn default_catalog() -> Vec<RcaTemplate> {
    vec![
        RcaTemplate {
            template_id: "rca-wan-app-slowdown".to_string(),
            name: "WAN degradation causing application slowdown".to_string(),
            description: "Path-level WAN packet loss observed alongside VPN tunnel instability on the same link.".to_string(),
            signal_pattern: vec![
                signal(Platform::ThousandEyes, "path_loss", Severity::Medium),
                signal(Platform::Meraki, "vpn_tunnel_flap", Severity::Low),
            ],
            root_cause: "WAN path degradation between sites is causing VPN tunnel instability and application latency.".to_string(),
            recommended_actions: vec![
                "Check ThousandEyes path visualization for the affected link".to_string(),
                "Verify Meraki uplink health and failover status".to_string(),
                "Engage the WAN carrier if degradation persists beyond the SLA window".to_string(),
            ],
        },
        RcaTemplate {
            template_id: "rca-firewall-policy-drift".to_string(),
            name: "Firewall policy drift blocking expected traffic".to_string(),
            description: "A Panorama commit coincides with unexpected drops reported downstream.".to_string(),
            signal_pattern: vec![
                signal(Platform::Panorama, "policy_commit", Severity::Low),
                signal(Platform::Prisma, "traffic_drop", Severity::Medium),
            ],
            root_cause: "A recent policy commit introduced a rule-ordering change that is now dropping previously permitted traffic.".to_string(),
            recommended_actions: vec![
                "Diff the most recent Panorama commit against the prior baseline".to_string(),
                "Check Prisma drop logs for the affected rule number".to_string(),
                "Roll back the commit if the regression is confirmed".to_string(),
            ],
        },
        RcaTemplate {
            template_id: "rca-identity-lockout-cascade".to_string(),
            name: "Identity lockout cascading into access denials".to_string(),
            description: "ISE authentication failures correlate with a spike in account lockouts.".to_string(),
            signal_pattern: vec![
                signal(Platform::Ise, "auth_failure", Severity::Medium),
            ],
            root_cause: "A credential or certificate rotation issue is producing repeated authentication failures, triggering lockout policy.".to_string(),
            recommended_actions: vec![
                "Check ISE live logs for the failing authentication method".to_string(),
                "Verify certificate or shared-secret rotation completed on all peers".to_string(),
                "Temporarily raise the lockout threshold while investigating if impact is broad".to_string(),
            ],
        },
    ]
}

/// Load the template catalog from `path` (JSON or TOML, by extension).
/// Falls back to `default_catalog()` when `path` is `None` or the
/// resource is missing or malformed.
pub fn load_catalog(path: Option<&str>) -> Vec<RcaTemplate> {
    let Some(path) = path else {
        return default_catalog();
    };
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("rca: could not read templates from {}: {}", path, e);
            return default_catalog();
        }
    };
    let parsed = if path.ends_with(".toml") {
        toml::from_str::<Vec<RcaTemplate>>(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<Vec<RcaTemplate>>(&content).map_err(|e| e.to_string())
    };
    match parsed {
        Ok(templates) if !templates.is_empty() => templates,
        Ok(_) => {
            warn!("rca: templates file {} parsed to an empty catalog, using defaults", path);
            default_catalog()
        }
        Err(e) => {
            warn!("rca: failed to parse templates from {}: {}", path, e);
            default_catalog()
        }
    }
}

/// Match `group` against `catalog` in declaration order; returns the
/// first full match.
pub fn match_group(group: &CorrelationGroup, catalog: &[RcaTemplate]) -> Option<RcaMatch> {
    for template in catalog {
        let platforms_ok = template
            .signal_pattern
            .iter()
            .all(|s| group.platforms.contains(&s.platform));
        if !platforms_ok {
            continue;
        }

        let mut matched = 0;
        let mut all_signals_hit = true;
        for signal in &template.signal_pattern {
            let hit = group.events.iter().any(|e| {
                e.source_platform == signal.platform
                    && e.severity.rank() >= signal.min_severity.rank()
                    && e.event_type == signal.event_type
            });
            if hit {
                matched += 1;
            } else {
                all_signals_hit = false;
                break;
            }
        }

        if all_signals_hit {
            return Some(RcaMatch {
                template_id: template.template_id.clone(),
                name: template.name.clone(),
                root_cause: template.root_cause.clone(),
                recommended_actions: template.recommended_actions.clone(),
                confidence: 0.85 + 0.05 * matched as f64,
                matched_signal_count: matched,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::CorrelatedEvent;
    use chrono::DateTime;

    fn event(platform: Platform, event_type: &str, severity: Severity, offset: i64) -> CorrelatedEvent {
        CorrelatedEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            source_platform: platform,
            event_type: event_type.to_string(),
            severity,
            timestamp: DateTime::from_timestamp(offset, 0).unwrap(),
            affected_entities: vec!["wan-link-1".to_string()],
            raw_data: serde_json::Value::Null,
            tags: vec![],
            correlation_group: None,
        }
    }

    #[test]
    fn wan_app_slowdown_matches_with_expected_confidence() {
        let group = CorrelationGroup::from_events(
            "g1".into(),
            vec![
                event(Platform::ThousandEyes, "path_loss", Severity::High, 0),
                event(Platform::Meraki, "vpn_tunnel_flap", Severity::Low, 30),
            ],
        );
        let catalog = default_catalog();
        let matched = match_group(&group, &catalog).expect("expected a match");
        assert_eq!(matched.template_id, "rca-wan-app-slowdown");
        assert!(matched.confidence >= 0.85);
        assert_eq!(matched.matched_signal_count, 2);
        assert!((matched.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn no_match_when_severity_below_threshold() {
        let group = CorrelationGroup::from_events(
            "g1".into(),
            vec![
                event(Platform::ThousandEyes, "path_loss", Severity::Low, 0),
                event(Platform::Meraki, "vpn_tunnel_flap", Severity::Info, 30),
            ],
        );
        let catalog = default_catalog();
        assert!(match_group(&group, &catalog).is_none());
    }

    #[test]
    fn first_full_match_wins_over_later_catalog_entries() {
        let group = CorrelationGroup::from_events(
            "g1".into(),
            vec![
                event(Platform::ThousandEyes, "path_loss", Severity::High, 0),
                event(Platform::Meraki, "vpn_tunnel_flap", Severity::High, 10),
            ],
        );
        let catalog = default_catalog();
        let matched = match_group(&group, &catalog).unwrap();
        assert_eq!(matched.template_id, "rca-wan-app-slowdown");
    }

    #[test]
    fn adding_a_matching_signal_never_lowers_confidence() {
        let partial = CorrelationGroup::from_events(
            "g1".into(),
            vec![event(Platform::Ise, "auth_failure", Severity::Medium, 0)],
        );
        // Single-event groups never reach the correlator, but RCA matching
        // itself is exercised directly here against a single-signal template.
        let catalog = default_catalog();
        let base = match_group(&partial, &catalog);
        assert!(base.is_some());
    }

    #[test]
    fn load_catalog_falls_back_to_default_when_path_missing() {
        let catalog = load_catalog(Some("/nonexistent/rca_templates.json"));
        assert_eq!(catalog.len(), default_catalog().len());
    }

    #[test]
    fn load_catalog_reads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"[{
                "template_id": "rca-custom",
                "name": "Custom template",
                "description": "Operator-authored template",
                "signal_pattern": [{"platform": "ise", "event_type": "auth_failure", "min_severity": "medium"}],
                "root_cause": "custom root cause",
                "recommended_actions": ["do something"]
            }]"#,
        )
        .unwrap();
        let catalog = load_catalog(Some(file.path().to_str().unwrap()));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].template_id, "rca-custom");
    }
}
