//! Downstream Forwarder — a JSON-RPC 2.0 client over HTTP, shared across
//! fan-out workers via a pooled `reqwest::Client`.

use reqwest::Client;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

/// Per-call timeout. Fan-out gathers all results within this bound; a
/// slow endpoint never blocks the others.
const CALL_TIMEOUT_SECS: u64 = 60;

/// The outcome of a single downstream tool call: either the JSON-RPC
/// result, or a human-readable error string. Never raises — the
/// fan-out engine renders either variant directly.
#[derive(Debug, Clone)]
pub enum ForwardOutcome {
    Result(Value),
    Error(String),
}

impl ForwardOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ForwardOutcome::Error(_))
    }
}

pub struct DownstreamForwarder {
    http: Client,
    next_id: AtomicU64,
}

impl DownstreamForwarder {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            next_id: AtomicU64::new(1),
        }
    }

    /// Invoke `tool_name` with `arguments` at `endpoint`, via
    /// `POST {endpoint}/mcp` with a JSON-RPC 2.0 `tools/call` envelope.
    pub async fn call(&self, endpoint: &str, tool_name: &str, arguments: Value) -> ForwardOutcome {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": tool_name, "arguments": arguments },
            "id": id,
        });

        let url = format!("{}/mcp", endpoint.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(CALL_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("forwarder: {} unreachable: {}", endpoint, e);
                return ForwardOutcome::Error(format!("{} unreachable", endpoint));
            }
        };

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("forwarder: malformed JSON-RPC response from {}: {}", endpoint, e);
                return ForwardOutcome::Error(format!("{} returned a malformed response", endpoint));
            }
        };

        Self::extract_result(body)
    }

    fn extract_result(body: Value) -> ForwardOutcome {
        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return ForwardOutcome::Error(message);
        }
        match body.get("result") {
            Some(result) => ForwardOutcome::Result(result.clone()),
            None => ForwardOutcome::Result(body),
        }
    }
}
