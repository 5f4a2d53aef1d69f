//! Directory Client — registers and discovers backend records against an
//! external directory service. Every operation is idempotent with
//! respect to caller effects, and transport failure never propagates:
//! callers see empty results or sentinel ids instead.

use crate::model::capability::{BackendRecord, Platform, Role};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

/// Returned by `register` when the directory is unreachable.
pub const SENTINEL_STANDALONE: &str = "standalone";
/// Returned by `register` on a non-transport error the caller should not retry.
pub const SENTINEL_ERROR: &str = "error";

#[derive(Debug, Clone, Default)]
pub struct DiscoverFilters {
    pub skills: Vec<String>,
    pub roles: Vec<Role>,
    pub platform: Option<Platform>,
}

impl DiscoverFilters {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.skills.is_empty() {
            params.push(("skills", self.skills.join(",")));
        }
        if !self.roles.is_empty() {
            let roles = self.roles.iter().map(Role::as_str).collect::<Vec<_>>().join(",");
            params.push(("roles", roles));
        }
        if let Some(platform) = &self.platform {
            params.push(("platform", platform.as_str().to_string()));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(alias = "id")]
    cid: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiscoverResponse {
    Wrapped { records: Vec<BackendRecord> },
    Bare(Vec<BackendRecord>),
}

impl DiscoverResponse {
    fn into_records(self) -> Vec<BackendRecord> {
        match self {
            DiscoverResponse::Wrapped { records } => records,
            DiscoverResponse::Bare(records) => records,
        }
    }
}

pub struct DirectoryClient {
    http: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Register a backend record. On any transport error returns the
    /// `"standalone"` sentinel rather than raising.
    pub async fn register(&self, record: &BackendRecord) -> String {
        let url = format!("{}/v1/records", self.base_url);
        match self.http.post(&url).json(record).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<RegisterResponse>().await {
                Ok(body) => body.cid,
                Err(e) => {
                    warn!("directory: malformed register response: {}", e);
                    SENTINEL_ERROR.to_string()
                }
            },
            Ok(resp) => {
                warn!("directory: register rejected with status {}", resp.status());
                SENTINEL_ERROR.to_string()
            }
            Err(e) => {
                warn!("directory: register transport error: {}", e);
                SENTINEL_STANDALONE.to_string()
            }
        }
    }

    /// Discover backend records matching `filters`. On any transport
    /// error, returns the empty list.
    pub async fn discover(&self, filters: &DiscoverFilters) -> Vec<BackendRecord> {
        let url = format!("{}/v1/records", self.base_url);
        let request = self.http.get(&url).query(&filters.query_params());
        match request.send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<DiscoverResponse>().await {
                Ok(body) => body.into_records(),
                Err(e) => {
                    warn!("directory: malformed discover response: {}", e);
                    Vec::new()
                }
            },
            Ok(resp) => {
                warn!("directory: discover rejected with status {}", resp.status());
                Vec::new()
            }
            Err(e) => {
                warn!("directory: discover transport error: {}", e);
                Vec::new()
            }
        }
    }

    /// Deregister a backend by id. Silently succeeds for the sentinel
    /// ids since there was never a real directory entry to remove.
    pub async fn deregister(&self, id: &str) -> bool {
        if id == SENTINEL_STANDALONE || id == SENTINEL_ERROR {
            return true;
        }
        let url = format!("{}/v1/records/{}", self.base_url, id);
        match self.http.delete(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("directory: deregister transport error: {}", e);
                false
            }
        }
    }

    /// Liveness probe against the directory's own health endpoint.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        matches!(self.http.get(&url).send().await, Ok(resp) if resp.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::default_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

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
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn register_returns_standalone_on_transport_error() {
        let client = DirectoryClient::new(default_http_client(), "http://127.0.0.1:1".to_string());
        let id = client.register(&sample_record()).await;
        assert_eq!(id, SENTINEL_STANDALONE);
    }

    #[tokio::test]
    async fn register_returns_cid_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cid": "abc123"})))
            .mount(&server)
            .await;
        let client = DirectoryClient::new(default_http_client(), server.uri());
        let id = client.register(&sample_record()).await;
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn discover_returns_empty_on_transport_error() {
        let client = DirectoryClient::new(default_http_client(), "http://127.0.0.1:1".to_string());
        let records = client.discover(&DiscoverFilters::default()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn discover_accepts_bare_array_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![sample_record()]))
            .mount(&server)
            .await;
        let client = DirectoryClient::new(default_http_client(), server.uri());
        let records = client.discover(&DiscoverFilters::default()).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "meraki-backend");
    }

    #[tokio::test]
    async fn discover_accepts_wrapped_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [sample_record()]
            })))
            .mount(&server)
            .await;
        let client = DirectoryClient::new(default_http_client(), server.uri());
        let records = client.discover(&DiscoverFilters::default()).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn deregister_sentinel_ids_always_succeed() {
        let client = DirectoryClient::new(default_http_client(), "http://127.0.0.1:1".to_string());
        assert!(client.deregister(SENTINEL_STANDALONE).await);
        assert!(client.deregister(SENTINEL_ERROR).await);
    }

    #[tokio::test]
    async fn health_false_on_transport_error() {
        let client = DirectoryClient::new(default_http_client(), "http://127.0.0.1:1".to_string());
        assert!(!client.health().await);
    }
}
