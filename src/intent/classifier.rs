//! Intent Classifier — an ordered table of (regex, category, platform
//! hint, confidence) triples. Patterns and confidences are a stable
//! contract: row order and values here must not change shape across
//! releases without a version bump, since callers depend on them.

use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Observability,
    Security,
    Automation,
    Configuration,
    Compliance,
    Identity,
    NetworkStatus,
    Help,
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Observability => "observability",
            Category::Security => "security",
            Category::Automation => "automation",
            Category::Configuration => "configuration",
            Category::Compliance => "compliance",
            Category::Identity => "identity",
            Category::NetworkStatus => "network_status",
            Category::Help => "help",
            Category::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub platform_hint: Option<&'static str>,
    pub confidence: f64,
}

struct Rule {
    pattern: &'static str,
    category: Category,
    platform_hint: Option<&'static str>,
    confidence: f64,
}

/// Declaration order is the contract; rows are listed most-specific
/// platform-tagged intents first, generic categories after, `help` and
/// the catch-all last.
const RULES: &[Rule] = &[
    Rule { pattern: r"(?i)\bmeraki\b.*\b(health|status|overview)\b", category: Category::Observability, platform_hint: Some("meraki"), confidence: 0.95 },
    Rule { pattern: r"(?i)\bcatalyst[\s_-]?center\b", category: Category::Observability, platform_hint: Some("catalyst_center"), confidence: 0.9 },
    Rule { pattern: r"(?i)\bthousandeyes\b", category: Category::Observability, platform_hint: Some("thousandeyes"), confidence: 0.9 },
    Rule { pattern: r"(?i)\b(health|status|overview|uptime)\b", category: Category::Observability, platform_hint: None, confidence: 0.9 },
    Rule { pattern: r"(?i)(correlat|root.cause|rca)", category: Category::Observability, platform_hint: Some("infer"), confidence: 0.9 },
    Rule { pattern: r"(?i)(predict|forecast).*(fail|outage|incident)", category: Category::Observability, platform_hint: Some("infer"), confidence: 0.9 },
    Rule { pattern: r"(?i)(anomal|unusual|abnormal).*(pattern|behavior|traffic)", category: Category::Observability, platform_hint: Some("infer"), confidence: 0.85 },
    Rule { pattern: r"(?i)risk\s+score", category: Category::Compliance, platform_hint: Some("infer"), confidence: 0.9 },
    Rule { pattern: r"(?i)\b(quarantine|block|isolate|contain)\b", category: Category::Automation, platform_hint: None, confidence: 0.92 },
    Rule { pattern: r"(?i)\b(panorama|prisma)\b.*\b(policy|rule|firewall)\b", category: Category::Security, platform_hint: Some("panorama"), confidence: 0.9 },
    Rule { pattern: r"(?i)\b(threat|malware|intrusion|incident)\b", category: Category::Security, platform_hint: None, confidence: 0.88 },
    Rule { pattern: r"(?i)\b(ise|identity services engine)\b", category: Category::Identity, platform_hint: Some("ise"), confidence: 0.9 },
    Rule { pattern: r"(?i)\b(login|logon|authentication|lockout|mfa)\b", category: Category::Identity, platform_hint: None, confidence: 0.85 },
    Rule { pattern: r"(?i)\b(umbrella|dns policy)\b", category: Category::Configuration, platform_hint: Some("umbrella"), confidence: 0.85 },
    Rule { pattern: r"(?i)\b(configure|config|provision|deploy|rollout)\b", category: Category::Configuration, platform_hint: None, confidence: 0.82 },
    Rule { pattern: r"(?i)\b(audit|compliance|regulatory|pci|hipaa)\b", category: Category::Compliance, platform_hint: None, confidence: 0.87 },
    Rule { pattern: r"(?i)\bnetwork[\s_-]?status\b", category: Category::NetworkStatus, platform_hint: None, confidence: 0.93 },
    Rule { pattern: r"(?i)^\s*help\s*$", category: Category::Help, platform_hint: None, confidence: 0.97 },
    Rule { pattern: r"(?i)\b(help|what can you do|commands)\b", category: Category::Help, platform_hint: None, confidence: 0.9 },
];

static COMPILED: LazyLock<Vec<(Regex, &'static Rule)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| (Regex::new(rule.pattern).expect("static classifier pattern must compile"), rule))
        .collect()
});

/// Classify `text` against the ordered rule table. The highest-confidence
/// matching row wins; ties keep the earlier row. No match yields `Unknown`
/// at confidence 0.
pub fn classify(text: &str) -> Classification {
    let mut best: Option<&'static Rule> = None;

    for (regex, rule) in COMPILED.iter() {
        if regex.is_match(text) {
            match best {
                Some(current) if current.confidence >= rule.confidence => {}
                _ => best = Some(rule),
            }
        }
    }

    match best {
        Some(rule) => Classification {
            category: rule.category,
            platform_hint: rule.platform_hint,
            confidence: rule.confidence,
        },
        None => Classification {
            category: Category::Unknown,
            platform_hint: None,
            confidence: 0.0,
        },
    }
}
