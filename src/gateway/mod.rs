//! HTTP surface for the gateway: a single JSON-RPC 2.0 endpoint
//! (`POST /mcp`) dispatching the eight role meta-tools and six INFER
//! tools, plus `GET /health` and `GET /routes` for operational
//! visibility. Mirrors the axum `Router` + shared `State` shape this
//! codebase uses for its HTTP surfaces.

pub mod mcp;

use crate::bus::EventBus;
use crate::bus::envelope::{CHANNEL_ALERTS_SECURITY, CHANNEL_EVENTS_CORRELATED, telemetry_channel};
use crate::directory::DirectoryClient;
use crate::forwarder::DownstreamForwarder;
use crate::infer::IngestBuffer;
use crate::model::capability::Platform;
use crate::routing::RoutingTableHandle;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Shared state between every handler: the live routing table, the
/// downstream forwarder, the event bus, and the analytics ingest buffer.
#[derive(Clone)]
pub struct GatewayState {
    pub routing: RoutingTableHandle,
    pub forwarder: Arc<DownstreamForwarder>,
    pub bus: Arc<EventBus>,
    pub buffer: Arc<IngestBuffer>,
    pub directory: Arc<DirectoryClient>,
    pub correlation_window_seconds: i64,
    pub anomaly_sensitivity: f64,
    pub rca_templates_path: Option<String>,
}

/// Subscribe `buffer` to every channel the INFER engine draws telemetry
/// from: the correlated-events and security-alerts channels, plus one
/// per known platform's telemetry channel. Each message is decoded as a
/// `CorrelatedEvent`; anything that doesn't decode is dropped silently,
/// since non-event traffic (approval requests, etc.) shares the bus.
pub fn wire_ingest_buffer(bus: &EventBus, buffer: Arc<IngestBuffer>) {
    let mut channels = vec![CHANNEL_EVENTS_CORRELATED.to_string(), CHANNEL_ALERTS_SECURITY.to_string()];
    channels.extend(Platform::ALL.iter().map(telemetry_channel));

    for channel in channels {
        let buffer = buffer.clone();
        bus.subscribe(&channel, move |msg| {
            let buffer = buffer.clone();
            async move {
                if let Some(event) = msg.decode_event() {
                    buffer.append(event);
                }
                Ok(())
            }
        });
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/mcp", post(mcp::handle_rpc))
        .route("/health", get(health_handler))
        .route("/routes", get(routes_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    let directory_ok = state.directory.health().await;
    Json(json!({
        "status": "ok",
        "directory_reachable": directory_ok,
        "tool_count": state.routing.snapshot().tool_count(),
    }))
}

async fn routes_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    let table = state.routing.snapshot();
    Json(json!({ "endpoints": table.all_endpoints() }))
}
