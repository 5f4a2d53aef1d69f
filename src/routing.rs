//! Dynamic Routing Fabric — a discovery-driven table mapping tools,
//! roles, and platforms onto concrete backend endpoints.
//!
//! The live table is held behind a `tokio::sync::watch` channel, the
//! same atomic-broadcast primitive this codebase uses for its
//! hot-reloadable config: many cheap readers clone a snapshot, one
//! writer task performs a whole-table swap. Readers never observe a
//! partially-rebuilt table.

use crate::model::capability::{BackendRecord, Platform, RoutingEntry};
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{info, warn};

/// Three derived indexes over the current routing-entry set, built from
/// scratch on every refresh and then swapped in atomically.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    by_tool: HashMap<String, RoutingEntry>,
    by_role: HashMap<String, Vec<String>>,
    by_platform: HashMap<String, Vec<String>>,
    endpoints: HashMap<String, String>,
}

impl RoutingTable {
    /// Rebuild all indexes from a freshly discovered (or statically
    /// configured) set of backend records. On duplicate tool names
    /// within the set, the last record processed wins — discovery order
    /// is authoritative, not an error condition.
    pub fn build(records: &[BackendRecord]) -> Self {
        let mut table = RoutingTable::default();

        for record in records {
            table
                .endpoints
                .insert(record.name.clone(), record.endpoint.clone());

            for capability in &record.capabilities {
                let entry = RoutingEntry::from_capability(record, capability);

                if table.by_tool.contains_key(&entry.tool_name) {
                    warn!(
                        "routing: duplicate tool name '{}', backend '{}' overrides previous registration",
                        entry.tool_name, entry.backend_name
                    );
                }

                for role in &entry.roles {
                    table
                        .by_role
                        .entry(role.as_str().to_string())
                        .or_default()
                        .push(entry.tool_name.clone());
                }
                table
                    .by_platform
                    .entry(entry.platform.as_str().to_string())
                    .or_default()
                    .push(entry.tool_name.clone());

                table.by_tool.insert(entry.tool_name.clone(), entry);
            }
        }

        table
    }

    pub fn get_tool(&self, tool_name: &str) -> Option<&RoutingEntry> {
        self.by_tool.get(tool_name)
    }

    pub fn tools_for_role(&self, role: &str) -> Vec<&RoutingEntry> {
        self.by_role
            .get(role)
            .into_iter()
            .flatten()
            .filter_map(|name| self.by_tool.get(name))
            .collect()
    }

    pub fn tools_for_platform(&self, platform: &Platform) -> Vec<&RoutingEntry> {
        self.by_platform
            .get(platform.as_str())
            .into_iter()
            .flatten()
            .filter_map(|name| self.by_tool.get(name))
            .collect()
    }

    pub fn all_endpoints(&self) -> &HashMap<String, String> {
        &self.endpoints
    }

    pub fn tool_count(&self) -> usize {
        self.by_tool.len()
    }
}

/// Owns the watch channel backing the live routing table. Cloning a
/// `RoutingTableHandle` is cheap and safe to share across fan-out
/// workers and the HTTP server.
#[derive(Clone)]
pub struct RoutingTableHandle {
    receiver: watch::Receiver<RoutingTable>,
}

impl RoutingTableHandle {
    /// Returns a consistent snapshot of the table as of the last swap.
    pub fn snapshot(&self) -> RoutingTable {
        self.receiver.borrow().clone()
    }
}

/// The write side, held by the refresh task. Cheap to clone — the
/// underlying `watch::Sender` is itself reference-counted.
#[derive(Clone)]
pub struct RoutingTableWriter {
    sender: watch::Sender<RoutingTable>,
}

impl RoutingTableWriter {
    pub fn new(initial: RoutingTable) -> (RoutingTableWriter, RoutingTableHandle) {
        let (sender, receiver) = watch::channel(initial);
        (RoutingTableWriter { sender }, RoutingTableHandle { receiver })
    }

    /// Atomically replace the live table. Existing snapshots held by
    /// readers remain valid; only future `snapshot()` calls see the swap.
    pub fn swap(&self, table: RoutingTable) {
        info!("routing: swapped table, {} tool(s) active", table.tool_count());
        let _ = self.sender.send(table);
    }
}
