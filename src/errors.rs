use thiserror::Error;

/// Typed error hierarchy for the gateway.
///
/// Use at module boundaries (directory lookups, downstream calls, config
/// validation, routing). Pure analytic functions (correlation, scoring,
/// classification) never return `Result` — see the propagation policy in
/// `DESIGN.md`. The `Internal` variant allows seamless conversion via `?`
/// from leaf code that still uses `anyhow::Result`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend call failed: {backend}: {message}")]
    BackendCall { backend: String, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    #[error("no route found for {0}")]
    RoutingMiss(String),

    #[error("tool '{0}' requires operator approval")]
    ApprovalRequired(String),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using `GatewayError`.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Whether this error is transient and worth a retry with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::RateLimit { .. } | GatewayError::Transport(_) => true,
            GatewayError::BackendCall { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = GatewayError::Config("missing directory_url".into());
        assert_eq!(err.to_string(), "configuration error: missing directory_url");
    }

    #[test]
    fn backend_call_display() {
        let err = GatewayError::BackendCall {
            backend: "fw-edge-01".into(),
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "backend call failed: fw-edge-01: connection refused"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn rate_limit_retryable() {
        let err = GatewayError::RateLimit {
            retry_after: Some(30),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn auth_error_not_retryable() {
        let err = GatewayError::Auth("invalid api key".into());
        assert!(!err.is_retryable());
    }

    #[test]
    fn routing_miss_not_retryable() {
        let err = GatewayError::RoutingMiss("firewall".into());
        assert_eq!(err.to_string(), "no route found for firewall");
        assert!(!err.is_retryable());
    }

    #[test]
    fn approval_required_display() {
        let err = GatewayError::ApprovalRequired("block_ip".into());
        assert_eq!(
            err.to_string(),
            "tool 'block_ip' requires operator approval"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn internal_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("something broke");
        let err: GatewayError = anyhow_err.into();
        assert!(matches!(err, GatewayError::Internal(_)));
        assert!(!err.is_retryable());
    }
}
