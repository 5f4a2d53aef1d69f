use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declares a set of `Config` fields that may be overridden by an
/// environment variable, generating `apply_env_overrides()`. Generalizes
/// the credential-override macro this codebase uses for provider API
/// keys to arbitrary typed fields.
macro_rules! define_env_overrides {
    ( $( $field:ident : $env_var:literal => $parse:expr ),+ $(,)? ) => {
        impl Config {
            /// Overlay environment variables onto an already-loaded config.
            /// Unset or unparseable variables leave the existing value untouched.
            pub fn apply_env_overrides(&mut self) {
                $(
                    if let Ok(raw) = std::env::var($env_var) {
                        let parse: fn(&str) -> Option<_> = $parse;
                        if let Some(value) = parse(&raw) {
                            self.$field = value;
                        } else {
                            tracing::warn!(
                                "config: ignoring unparseable {}={:?}",
                                $env_var, raw
                            );
                        }
                    }
                )+
            }
        }
    };
}

/// Typed runtime configuration, loaded from a JSON/TOML file with
/// environment variable overrides layered on top (`OXIGATE_*`-free
/// names per the table in this crate's design notes — the env var
/// names themselves follow the spec's own naming).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directory_url: String,
    pub bus_url: String,
    pub gateway_host: String,
    pub gateway_port: u16,
    pub correlation_window_seconds: u64,
    pub anomaly_sensitivity: f64,
    pub static_fallback: HashMap<String, String>,
    pub rca_templates_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_url: "http://localhost:8500".to_string(),
            bus_url: "redis://localhost:6379".to_string(),
            gateway_host: "0.0.0.0".to_string(),
            gateway_port: 8088,
            correlation_window_seconds: 300,
            anomaly_sensitivity: 0.85,
            static_fallback: HashMap::new(),
            rca_templates_path: None,
        }
    }
}

define_env_overrides! {
    directory_url: "DIRECTORY_URL" => |s| Some(s.to_string()),
    bus_url: "REDIS_URL" => |s| Some(s.to_string()),
    gateway_port: "GATEWAY_PORT" => |s| s.parse::<u16>().ok(),
    correlation_window_seconds: "CORRELATION_WINDOW_SECONDS" => |s| s.parse::<u64>().ok(),
    anomaly_sensitivity: "ANOMALY_SENSITIVITY" => |s| s.parse::<f64>().ok(),
}

impl Config {
    /// Field-level validation used by the `doctor` self-check.
    pub fn validate(&self) -> anyhow::Result<()> {
        if url::Url::parse(&self.directory_url).is_err() {
            anyhow::bail!("directory_url is not a valid URL: {}", self.directory_url);
        }
        if !(0.0..=1.0).contains(&self.anomaly_sensitivity) {
            anyhow::bail!(
                "anomaly_sensitivity must be in [0.0, 1.0], got {}",
                self.anomaly_sensitivity
            );
        }
        if self.gateway_port == 0 {
            anyhow::bail!("gateway_port must be nonzero");
        }
        Ok(())
    }

    /// Clamp `anomaly_sensitivity` into its documented valid range. Values
    /// loaded from untrusted config files may fall outside it.
    pub fn clamp_sensitivity(&mut self) {
        self.anomaly_sensitivity = self.anomaly_sensitivity.clamp(0.0, 1.0);
    }
}
