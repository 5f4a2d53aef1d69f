//! Role Fan-Out Engine — the six role meta-tools plus the cross-role
//! `network_status` summary. Direct calls to approval-required tools
//! publish an `approval:request` envelope before dispatch; execution is
//! never blocked on a response in this version (see `DESIGN.md`).

use crate::audit::{self, ActionType};
use crate::bus::envelope::{ApprovalRequestEnvelope, CHANNEL_APPROVAL_REQUEST};
use crate::bus::EventBus;
use crate::forwarder::{DownstreamForwarder, ForwardOutcome};
use crate::model::capability::{Platform, RoutingEntry};
use crate::routing::RoutingTableHandle;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Input shape shared by every role meta-tool; all fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleQuery {
    pub query: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    pub tool_name: Option<String>,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

pub struct FanOutEngine<'a> {
    routing: &'a RoutingTableHandle,
    forwarder: &'a DownstreamForwarder,
    bus: &'a EventBus,
}

impl<'a> FanOutEngine<'a> {
    pub fn new(routing: &'a RoutingTableHandle, forwarder: &'a DownstreamForwarder, bus: &'a EventBus) -> Self {
        Self { routing, forwarder, bus }
    }

    /// Dispatch a role query and render the result as Markdown. Errors
    /// are rendered as Markdown beginning with `❌` rather than raised.
    pub async fn dispatch_role(&self, role: &str, query: &RoleQuery, caller_identity: Option<&str>) -> String {
        let table = self.routing.snapshot();

        if let Some(tool_name) = &query.tool_name {
            return self.direct_call(&table, tool_name, query, caller_identity).await;
        }

        let mut entries: Vec<RoutingEntry> = table
            .tools_for_role(role)
            .into_iter()
            .cloned()
            .collect();

        if !query.platforms.is_empty() {
            entries.retain(|e| query.platforms.iter().any(|p| p == e.platform.as_str()));
        }

        let broadcastable: Vec<&RoutingEntry> = entries.iter().filter(|e| e.is_broadcastable()).collect();

        if broadcastable.is_empty() {
            return Self::render_discoverability(role, &entries, query.query.as_deref());
        }

        let mut futures = Vec::with_capacity(broadcastable.len());
        for entry in &broadcastable {
            futures.push(self.forwarder.call(&entry.endpoint, &entry.tool_name, serde_json::json!({})));
        }
        let outcomes = futures_util::future::join_all(futures).await;

        Self::render_markdown(&broadcastable, &outcomes)
    }

    /// Cross-role `network_status` summary: same broadcastable-tool
    /// aggregation logic run over every tool in the table, not just one role.
    pub async fn network_status(&self) -> String {
        let table = self.routing.snapshot();

        let mut seen = std::collections::HashSet::new();
        let broadcastable: Vec<RoutingEntry> = crate::model::capability::Role::ALL
            .iter()
            .flat_map(|role| table.tools_for_role(role.as_str()))
            .filter(|e| e.is_broadcastable() && seen.insert(e.tool_name.clone()))
            .cloned()
            .collect();

        if broadcastable.is_empty() {
            return "No broadcastable status tools are currently registered.".to_string();
        }

        let refs: Vec<&RoutingEntry> = broadcastable.iter().collect();
        let mut futures = Vec::with_capacity(refs.len());
        for entry in &refs {
            futures.push(self.forwarder.call(&entry.endpoint, &entry.tool_name, serde_json::json!({})));
        }
        let outcomes = futures_util::future::join_all(futures).await;
        Self::render_markdown(&refs, &outcomes)
    }

    async fn direct_call(
        &self,
        table: &crate::routing::RoutingTable,
        tool_name: &str,
        query: &RoleQuery,
        caller_identity: Option<&str>,
    ) -> String {
        let Some(entry) = table.get_tool(tool_name) else {
            return format!("❌ no route found for tool `{}`", tool_name);
        };

        if entry.requires_approval {
            self.publish_approval_request(entry, caller_identity, &query.arguments);
        }
        if entry.requires_approval || entry.destructive {
            let action = if entry.destructive { ActionType::Delete } else { ActionType::Execute };
            audit::record(action, entry, caller_identity, &query.arguments);
        }

        match self.forwarder.call(&entry.endpoint, tool_name, query.arguments.clone()).await {
            ForwardOutcome::Result(value) => {
                format!("**{}**\n\n```json\n{}\n```", tool_name, value)
            }
            ForwardOutcome::Error(message) => format!("❌ {}: {}", tool_name, message),
        }
    }

    fn publish_approval_request(&self, entry: &RoutingEntry, caller_identity: Option<&str>, arguments: &serde_json::Value) {
        let mut hasher = Sha256::new();
        hasher.update(arguments.to_string().as_bytes());
        let parameters_hash = format!("{:x}", hasher.finalize());

        let envelope = ApprovalRequestEnvelope {
            approval_id: uuid::Uuid::new_v4().to_string(),
            tool_name: entry.tool_name.clone(),
            caller_identity: caller_identity.map(str::to_string),
            platform: entry.platform.clone(),
            parameters_hash,
            timestamp: chrono::Utc::now(),
        };
        if let Ok(payload) = serde_json::to_value(&envelope) {
            self.bus.publish(CHANNEL_APPROVAL_REQUEST, payload);
        }
    }

    /// Render a discoverability listing. When the caller supplied free-form
    /// `query` text, annotate it with the intent classifier's best guess —
    /// informational only, it never alters which entries are listed.
    fn render_discoverability(role: &str, entries: &[RoutingEntry], query: Option<&str>) -> String {
        if entries.is_empty() {
            return format!("No tools are currently registered for role `{}`.", role);
        }
        let mut out = format!("## Available `{}` tools\n\n", role);
        if let Some(text) = query {
            let classification = crate::intent::classify(text);
            let _ = writeln!(
                out,
                "_Interpreted as `{}` intent (confidence {:.2})_\n",
                classification.category.as_str(),
                classification.confidence
            );
        }
        for entry in entries {
            let _ = writeln!(out, "- `{}` ({})", entry.tool_name, entry.backend_name);
        }
        out
    }

    fn render_markdown(entries: &[&RoutingEntry], outcomes: &[ForwardOutcome]) -> String {
        let mut out = String::new();
        for (entry, outcome) in entries.iter().zip(outcomes) {
            let _ = writeln!(out, "## {}", entry.backend_name);
            match outcome {
                ForwardOutcome::Result(value) => {
                    let _ = writeln!(out, "```json\n{}\n```\n", value);
                }
                ForwardOutcome::Error(message) => {
                    let _ = writeln!(out, "❌ {}\n", message);
                }
            }
        }
        out
    }
}

/// True when `platform` appears in the caller-supplied filter list, or
/// the filter list is empty (meaning "no restriction").
pub fn platform_matches(filter: &[String], platform: &Platform) -> bool {
    filter.is_empty() || filter.iter().any(|p| p == platform.as_str())
}
