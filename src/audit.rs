//! Approval & Audit — immutable audit records created synchronously on
//! every tool invocation that is destructive or approval-required.
//! Append-only; no operation in this module ever deletes or mutates an
//! existing entry. Retention beyond process lifetime is an external
//! policy concern per the design notes.

use crate::model::capability::{Platform, RoutingEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{LazyLock, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Read,
    Write,
    Delete,
    Execute,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Read => "read",
            ActionType::Write => "write",
            ActionType::Delete => "delete",
            ActionType::Execute => "execute",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub audit_id: String,
    pub correlation_id: String,
    pub timestamp: DateTime<Utc>,
    pub caller_identity: Option<String>,
    pub tool_name: String,
    pub platform: Platform,
    pub action_type: ActionType,
    pub parameters_hash: String,
    pub approver: Option<String>,
}

static AUDIT_LOG: LazyLock<Mutex<Vec<AuditEntry>>> = LazyLock::new(|| Mutex::new(Vec::new()));

fn hash_parameters(parameters: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parameters.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Append a new entry for a tool invocation. Synchronous, matching the
/// spec's requirement that audit creation happens alongside dispatch
/// rather than as a best-effort async side effect.
pub fn record(
    action: ActionType,
    entry: &RoutingEntry,
    caller_identity: Option<&str>,
    parameters: &serde_json::Value,
) -> AuditEntry {
    let audit_entry = AuditEntry {
        audit_id: uuid::Uuid::new_v4().to_string(),
        correlation_id: uuid::Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        caller_identity: caller_identity.map(str::to_string),
        tool_name: entry.tool_name.clone(),
        platform: entry.platform.clone(),
        action_type: action,
        parameters_hash: hash_parameters(parameters),
        approver: None,
    };
    AUDIT_LOG
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push(audit_entry.clone());
    audit_entry
}

/// Immutable snapshot of every audit entry recorded so far, most recent last.
pub fn snapshot() -> Vec<AuditEntry> {
    AUDIT_LOG
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}
