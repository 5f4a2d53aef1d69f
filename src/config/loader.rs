use crate::config::schema::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn get_config_path() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("OXIGATE_HOME") {
        return Ok(PathBuf::from(home).join("config.json"));
    }
    Ok(dirs::home_dir()
        .context("could not determine home directory")?
        .join(".oxigate")
        .join("config.json"))
}

/// Load config from `config_path` (or the default path) if it exists,
/// otherwise fall back to defaults. Environment variables are always
/// layered on top, so a deployment with no config file on disk still
/// configures entirely from the environment.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config JSON from {}", path.display()))?
    } else {
        Config::default()
    };

    config.apply_env_overrides();
    config.clamp_sensitivity();
    Ok(config)
}

/// Load the static backend-name → endpoint-URL fallback map used when
/// discovery returns nothing at startup. Accepts JSON or TOML, inferred
/// from the file extension; an absent path yields an empty map.
pub fn load_static_fallback(path: Option<&str>) -> Result<std::collections::HashMap<String, String>> {
    let Some(path) = path else {
        return Ok(std::collections::HashMap::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read static fallback map from {}", path))?;
    if path.ends_with(".toml") {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse static fallback TOML from {}", path))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse static fallback JSON from {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_config_falls_back_to_defaults_when_missing() {
        let config = load_config(Some(Path::new("/nonexistent/path/config.json"))).unwrap();
        assert_eq!(config.gateway_port, 8088);
    }

    #[test]
    fn load_config_reads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"gateway_port": 9999}}"#).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.gateway_port, 9999);
    }

    #[test]
    fn load_static_fallback_parses_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"meraki-backend": "https://meraki.internal:8443"}}"#).unwrap();
        let map = load_static_fallback(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(
            map.get("meraki-backend"),
            Some(&"https://meraki.internal:8443".to_string())
        );
    }

    #[test]
    fn load_static_fallback_none_is_empty() {
        let map = load_static_fallback(None).unwrap();
        assert!(map.is_empty());
    }
}
