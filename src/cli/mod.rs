//! `oxigate` command-line surface — `serve`, `doctor`, `routes`.

pub mod doctor;

use crate::bus::EventBus;
use crate::directory::{DirectoryClient, DiscoverFilters};
use crate::forwarder::DownstreamForwarder;
use crate::infer::IngestBuffer;
use crate::lifecycle::LifecycleManager;
use crate::routing::RoutingTable;
use crate::utils::http::default_http_client;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "oxigate", about = "Network-operations gateway: routing fabric and INFER core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the bus listener, HTTP MCP surface, and refresh loop.
    Serve,
    /// Run environment self-checks and print a report.
    Doctor,
    /// Dump the current (or freshly discovered) routing table as JSON.
    Routes,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => serve().await,
        Command::Doctor => {
            let ok = doctor::run().await;
            std::process::exit(if ok { 0 } else { 1 });
        }
        Command::Routes => routes().await,
    }
}

async fn serve() -> Result<()> {
    let config = crate::config::load_config(None)?;
    config.validate()?;

    let directory = Arc::new(DirectoryClient::new(default_http_client(), config.directory_url.clone()));
    let (lifecycle, routing) = LifecycleManager::start(directory.clone(), &config).await;
    let refresh_handle = lifecycle.spawn_refresh_loop(config.clone());

    let bus = Arc::new(EventBus::new());
    let buffer = Arc::new(IngestBuffer::default());
    crate::gateway::wire_ingest_buffer(&bus, buffer.clone());

    let state = crate::gateway::GatewayState {
        routing,
        forwarder: Arc::new(DownstreamForwarder::new(default_http_client())),
        bus,
        buffer,
        directory,
        correlation_window_seconds: config.correlation_window_seconds as i64,
        anomaly_sensitivity: config.anomaly_sensitivity,
        rca_templates_path: config.rca_templates_path.clone(),
    };

    let app = crate::gateway::build_router(state);
    let addr = format!("{}:{}", config.gateway_host, config.gateway_port);
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    lifecycle.shutdown().await;
    refresh_handle.abort();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

async fn routes() -> Result<()> {
    let config = crate::config::load_config(None)?;
    let directory = DirectoryClient::new(default_http_client(), config.directory_url.clone());
    let records = directory.discover(&DiscoverFilters::default()).await;
    let table = RoutingTable::build(&records);
    println!("{}", serde_json::to_string_pretty(table.all_endpoints())?);
    Ok(())
}
