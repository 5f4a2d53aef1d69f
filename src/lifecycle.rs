//! Discovery lifecycle — startup registration, periodic routing-table
//! refresh, and graceful shutdown with deregistration.

use crate::config::Config;
use crate::directory::{DirectoryClient, DiscoverFilters};
use crate::model::capability::{BackendRecord, Platform};
use crate::routing::{RoutingTable, RoutingTableWriter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const REFRESH_INTERVAL_SECS: u64 = 60;
const SHUTDOWN_GRACE_SECS: u64 = 5;

/// Parse the static fallback map (tool_name -> endpoint) into minimal
/// synthetic backend records, used when discovery returns nothing.
fn synthesize_static_backends(static_fallback: &HashMap<String, String>) -> Vec<BackendRecord> {
    static_fallback
        .iter()
        .map(|(tool_name, endpoint)| {
            let capability = crate::model::capability::Capability::new(
                tool_name,
                crate::model::capability::Platform::Other("static".to_string()),
                vec![],
            );
            BackendRecord {
                name: format!("static:{tool_name}"),
                version: "0.0.0-static".to_string(),
                description: Some("synthesized from static fallback configuration".to_string()),
                platform: crate::model::capability::Platform::Other("static".to_string()),
                skills: vec![],
                domains: vec![],
                transport: "jsonrpc-http".to_string(),
                endpoint: endpoint.clone(),
                capabilities: vec![capability],
                metadata: HashMap::new(),
            }
        })
        .collect()
}

/// Discover backends, falling back to the static map when discovery
/// returns no records at all.
async fn discover_records(directory: &DirectoryClient, config: &Config) -> Vec<BackendRecord> {
    let records = directory.discover(&DiscoverFilters::default()).await;
    if !records.is_empty() {
        return records;
    }
    warn!("directory discovery returned no records; falling back to static configuration");
    synthesize_static_backends(&config.static_fallback)
}

/// The record the gateway announces about itself at startup, so other
/// backends can discover its meta-tools the same way it discovers theirs.
fn self_record(config: &Config) -> BackendRecord {
    BackendRecord {
        name: "oxigate".to_string(),
        version: crate::VERSION.to_string(),
        description: Some("network-operations gateway: routing fabric and INFER core".to_string()),
        platform: Platform::Infer,
        skills: vec![],
        domains: vec![],
        transport: "jsonrpc-http".to_string(),
        endpoint: format!("http://{}:{}/mcp", config.gateway_host, config.gateway_port),
        capabilities: vec![],
        metadata: HashMap::new(),
    }
}

/// Runs the periodic refresh loop until `shutdown` resolves, then
/// deregisters and returns after the grace window.
pub struct LifecycleManager {
    directory: Arc<DirectoryClient>,
    writer: RoutingTableWriter,
    backend_id: Arc<std::sync::Mutex<Option<String>>>,
    running: Arc<AtomicBool>,
}

impl LifecycleManager {
    /// Perform startup discovery and construct the initial routing table.
    pub async fn start(directory: Arc<DirectoryClient>, config: &Config) -> (Self, crate::routing::RoutingTableHandle) {
        let records = discover_records(&directory, config).await;
        let table = RoutingTable::build(&records);
        info!("lifecycle: startup discovery populated {} routes", table.tool_count());
        let (writer, handle) = RoutingTableWriter::new(table);

        let cid = directory.register(&self_record(config)).await;
        info!("lifecycle: registered with directory as {}", cid);

        let manager = Self {
            directory,
            writer,
            backend_id: Arc::new(std::sync::Mutex::new(Some(cid))),
            running: Arc::new(AtomicBool::new(true)),
        };
        (manager, handle)
    }

    /// Spawn the 60-second periodic refresh task. Returns its handle so
    /// callers can await it during shutdown.
    pub fn spawn_refresh_loop(&self, config: Config) -> tokio::task::JoinHandle<()> {
        let directory = self.directory.clone();
        let writer = self.writer.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(REFRESH_INTERVAL_SECS));
            interval.tick().await; // first tick fires immediately; skip it, startup already discovered
            while running.load(Ordering::Relaxed) {
                interval.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                let records = discover_records(&directory, &config).await;
                let table = RoutingTable::build(&records);
                writer.swap(table);
            }
        })
    }

    /// Stop the refresh loop and deregister from the directory, waiting
    /// up to `SHUTDOWN_GRACE_SECS` for in-flight work to settle.
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(id) = self.backend_id.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone() {
            let deregistered = self.directory.deregister(&id).await;
            if !deregistered {
                warn!("lifecycle: deregistration of {} did not confirm", id);
            }
        }
        tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;
    }
}
