use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// A network platform a backend speaks for.
///
/// Closed set of known platforms plus a catch-all so an unrecognized tag
/// from discovery never panics or gets silently dropped, mirroring the
/// channel-tag convention used elsewhere in this codebase. Serializes to
/// its canonical lowercase string form rather than deriving serde's
/// default enum representation, since the catch-all variant carries data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Meraki,
    CatalystCenter,
    ThousandEyes,
    Panorama,
    Prisma,
    Umbrella,
    Ise,
    Infer,
    Other(String),
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Platform::from_str(&s))
    }
}

impl Platform {
    /// Every known platform with a dedicated telemetry channel. `Other`
    /// is excluded — its channel name is only known at discovery time.
    pub const ALL: [Platform; 8] = [
        Platform::Meraki,
        Platform::CatalystCenter,
        Platform::ThousandEyes,
        Platform::Panorama,
        Platform::Prisma,
        Platform::Umbrella,
        Platform::Ise,
        Platform::Infer,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Meraki => "meraki",
            Platform::CatalystCenter => "catalyst_center",
            Platform::ThousandEyes => "thousandeyes",
            Platform::Panorama => "panorama",
            Platform::Prisma => "prisma",
            Platform::Umbrella => "umbrella",
            Platform::Ise => "ise",
            Platform::Infer => "infer",
            Platform::Other(s) => s,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "meraki" => Platform::Meraki,
            "catalyst_center" => Platform::CatalystCenter,
            "thousandeyes" => Platform::ThousandEyes,
            "panorama" => Platform::Panorama,
            "prisma" => Platform::Prisma,
            "umbrella" => Platform::Umbrella,
            "ise" => Platform::Ise,
            "infer" => Platform::Infer,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the six meta-tool categories used for role-based fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Observability,
    Security,
    Automation,
    Configuration,
    Compliance,
    Identity,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Observability => "observability",
            Role::Security => "security",
            Role::Automation => "automation",
            Role::Configuration => "configuration",
            Role::Compliance => "compliance",
            Role::Identity => "identity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "observability" => Role::Observability,
            "security" => Role::Security,
            "automation" => Role::Automation,
            "configuration" => Role::Configuration,
            "compliance" => Role::Compliance,
            "identity" => Role::Identity,
            _ => return None,
        })
    }

    pub const ALL: [Role; 6] = [
        Role::Observability,
        Role::Security,
        Role::Automation,
        Role::Configuration,
        Role::Compliance,
        Role::Identity,
    ];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named operation exposed by a backend. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub tool_name: String,
    pub description: String,
    pub roles: Vec<Role>,
    pub platform: Platform,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub destructive: bool,
    #[serde(default)]
    pub requires_approval: bool,
}

impl Capability {
    pub fn new(tool_name: impl Into<String>, platform: Platform, roles: Vec<Role>) -> Self {
        Self {
            tool_name: tool_name.into(),
            description: String::new(),
            roles,
            platform,
            read_only: false,
            destructive: false,
            requires_approval: false,
        }
    }
}

/// Declared identity of a backend, as returned by discovery or loaded
/// from the static fallback. Serializes to the canonical JSON shape used
/// for directory exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRecord {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub platform: Platform,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    pub transport: String,
    pub endpoint: String,
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BackendRecord {
    /// `endpoint` is well-formed and parses as an absolute http(s) URL.
    pub fn has_well_formed_endpoint(&self) -> bool {
        url::Url::parse(&self.endpoint)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

/// The materialized join of a Capability and the endpoint that serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub tool_name: String,
    pub backend_name: String,
    pub endpoint: String,
    pub platform: Platform,
    pub roles: Vec<Role>,
    pub read_only: bool,
    pub destructive: bool,
    pub requires_approval: bool,
}

impl RoutingEntry {
    pub fn from_capability(backend: &BackendRecord, capability: &Capability) -> Self {
        Self {
            tool_name: capability.tool_name.clone(),
            backend_name: backend.name.clone(),
            endpoint: backend.endpoint.clone(),
            platform: capability.platform.clone(),
            roles: capability.roles.clone(),
            read_only: capability.read_only,
            destructive: capability.destructive,
            requires_approval: capability.requires_approval,
        }
    }

    pub fn is_broadcastable(&self) -> bool {
        const MARKERS: [&str; 3] = ["health", "overview", "status"];
        let lower = self.tool_name.to_lowercase();
        MARKERS.iter().any(|m| lower.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_known_values() {
        for s in ["meraki", "catalyst_center", "thousandeyes", "infer"] {
            assert_eq!(Platform::from_str(s).as_str(), s);
        }
    }

    #[test]
    fn platform_all_round_trips_through_as_str() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_str(platform.as_str()), platform);
        }
    }

    #[test]
    fn platform_preserves_unknown_tags() {
        let p = Platform::from_str("acme_firewall");
        assert_eq!(p.as_str(), "acme_firewall");
        assert!(matches!(p, Platform::Other(_)));
    }

    #[test]
    fn role_round_trips() {
        for r in Role::ALL {
            assert_eq!(Role::from_str(r.as_str()), Some(r));
        }
    }

    #[test]
    fn role_rejects_unknown() {
        assert_eq!(Role::from_str("nonexistent"), None);
    }

    #[test]
    fn backend_record_validates_endpoint() {
        let mut record = sample_record();
        assert!(record.has_well_formed_endpoint());
        record.endpoint = "not a url".to_string();
        assert!(!record.has_well_formed_endpoint());
        record.endpoint = "ftp://example.com".to_string();
        assert!(!record.has_well_formed_endpoint());
    }

    #[test]
    fn routing_entry_detects_broadcastable_tools() {
        let backend = sample_record();
        let cap = Capability::new("meraki_network_health", Platform::Meraki, vec![Role::Observability]);
        let entry = RoutingEntry::from_capability(&backend, &cap);
        assert!(entry.is_broadcastable());

        let cap2 = Capability::new("block_ip", Platform::Meraki, vec![Role::Security]);
        let entry2 = RoutingEntry::from_capability(&backend, &cap2);
        assert!(!entry2.is_broadcastable());
    }

    fn sample_record() -> BackendRecord {
        BackendRecord {
            name: "meraki-backend".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            platform: Platform::Meraki,
            skills: vec![],
            domains: vec![],
            transport: "jsonrpc-http".to_string(),
            endpoint: "https://meraki-backend.internal:8443".to_string(),
            capabilities: vec![],
            metadata: HashMap::new(),
        }
    }
}
