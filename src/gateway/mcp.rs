//! JSON-RPC 2.0 `tools/call` dispatch for the fourteen tools the
//! gateway exposes at its own `/mcp` endpoint: the eight meta-tools
//! (six role tools, `network_status`, `gateway_health`) and the six
//! read-only INFER tools.

use crate::audit;
use crate::errors::GatewayError;
use crate::fanout::{FanOutEngine, RoleQuery};
use crate::gateway::GatewayState;
use crate::infer::{anomaly, correlation, predictor, rca, risk};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

const ROLE_TOOLS: [&str; 6] = ["observability", "security", "automation", "configuration", "compliance", "identity"];

pub async fn handle_rpc(State(state): State<GatewayState>, Json(request): Json<Value>) -> impl IntoResponse {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");
    if method != "tools/call" {
        return Json(error_envelope(id, -32601, &format!("unsupported method '{}'", method)));
    }

    let params = request.get("params").cloned().unwrap_or(Value::Null);
    let tool_name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let result = dispatch_tool(&state, tool_name, arguments).await;
    match result {
        Ok(value) => Json(result_envelope(id, value)),
        Err(err) => Json(error_envelope(id, -32000, &err.to_string())),
    }
}

async fn dispatch_tool(state: &GatewayState, tool_name: &str, arguments: Value) -> Result<Value, GatewayError> {
    if ROLE_TOOLS.contains(&tool_name) {
        let engine = FanOutEngine::new(&state.routing, &state.forwarder, &state.bus);
        let query: RoleQuery = serde_json::from_value(arguments).unwrap_or_default();
        let caller_identity = query_caller_identity(&query);
        return Ok(json!(engine.dispatch_role(tool_name, &query, caller_identity.as_deref()).await));
    }

    match tool_name {
        "network_status" => {
            let engine = FanOutEngine::new(&state.routing, &state.forwarder, &state.bus);
            Ok(json!(engine.network_status().await))
        }
        "gateway_health" => {
            let directory_ok = state.directory.health().await;
            Ok(json!({
                "status": "ok",
                "directory_reachable": directory_ok,
                "tool_count": state.routing.snapshot().tool_count(),
                "audit_entries": audit::snapshot().len(),
            }))
        }
        "infer_correlate_events" => {
            let window_seconds = arguments
                .get("window_seconds")
                .and_then(Value::as_i64)
                .unwrap_or(state.correlation_window_seconds)
                .clamp(30, 3600);
            let min_severity = arguments.get("min_severity").and_then(Value::as_str).and_then(crate::model::event::Severity::from_str);
            let platforms: Vec<String> = arguments
                .get("platforms")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();

            let mut events = state.buffer.snapshot();
            if let Some(min_severity) = min_severity {
                events.retain(|e| e.severity.rank() >= min_severity.rank());
            }
            if !platforms.is_empty() {
                events.retain(|e| platforms.iter().any(|p| p == e.source_platform.as_str()));
            }

            let groups = correlation::correlate(&events, window_seconds);
            Ok(serde_json::to_value(&groups).unwrap_or(Value::Null))
        }
        "infer_root_cause_analysis" => {
            let window_seconds = arguments.get("window_seconds").and_then(Value::as_i64).unwrap_or(state.correlation_window_seconds);
            let prefix = arguments.get("correlation_id_prefix").and_then(Value::as_str);

            let events = state.buffer.snapshot();
            let groups = correlation::correlate(&events, window_seconds);
            let catalog = rca::load_catalog(state.rca_templates_path.as_deref());
            let matches: Vec<Value> = groups
                .iter()
                .filter(|g| prefix.is_none_or(|p| g.group_id.starts_with(p)))
                .filter_map(|g| rca::match_group(g, &catalog).map(|m| (g, m)))
                .map(|(g, m)| {
                    json!({
                        "group_id": g.group_id,
                        "template_id": m.template_id,
                        "name": m.name,
                        "root_cause": m.root_cause,
                        "recommended_actions": m.recommended_actions,
                        "confidence": m.confidence,
                        "matched_signal_count": m.matched_signal_count,
                    })
                })
                .collect();
            Ok(json!(matches))
        }
        "infer_detect_anomalies" => {
            let lookback_minutes = arguments.get("lookback_minutes").and_then(Value::as_i64).unwrap_or(60).clamp(5, 1440);
            let min_confidence = arguments.get("min_confidence").and_then(Value::as_f64).unwrap_or(0.0).clamp(0.0, 1.0);

            let cutoff = Utc::now() - chrono::Duration::minutes(lookback_minutes);
            let events: Vec<_> = state.buffer.snapshot().into_iter().filter(|e| e.timestamp >= cutoff).collect();
            let anomalies: Vec<_> = anomaly::detect_anomalies(&events, state.anomaly_sensitivity)
                .into_iter()
                .filter(|a| a.confidence >= min_confidence)
                .map(|a| {
                    json!({
                        "platform": a.platform.as_str(),
                        "event_type": a.event_type,
                        "ratio": a.ratio,
                        "severity": a.severity,
                        "confidence": a.confidence,
                    })
                })
                .collect();
            Ok(json!(anomalies))
        }
        "infer_predict_failures" => {
            let lookback_minutes = arguments.get("lookback_minutes").and_then(Value::as_i64).unwrap_or(30).clamp(5, 240);
            let cutoff = Utc::now() - chrono::Duration::minutes(lookback_minutes);
            let events: Vec<_> = state.buffer.snapshot().into_iter().filter(|e| e.timestamp >= cutoff).collect();
            let predictions: Vec<_> = predictor::predict(&events, &[])
                .into_iter()
                .map(|p| {
                    json!({
                        "kind": p.kind,
                        "risk_level": p.risk_level,
                        "confidence": p.confidence,
                        "time_horizon_minutes": p.time_horizon_minutes,
                        "preemptive_actions": p.preemptive_actions,
                        "platform": p.platform.map(|pl| pl.as_str().to_string()),
                    })
                })
                .collect();
            Ok(json!(predictions))
        }
        "infer_get_incident_timeline" => {
            let hours = arguments.get("hours").and_then(Value::as_i64).unwrap_or(24).clamp(1, 168);
            let min_severity = arguments.get("min_severity").and_then(Value::as_str).and_then(crate::model::event::Severity::from_str);
            let cutoff = Utc::now() - chrono::Duration::hours(hours);
            let mut events: Vec<_> = state.buffer.snapshot().into_iter().filter(|e| e.timestamp >= cutoff).collect();
            if let Some(min_severity) = min_severity {
                events.retain(|e| e.severity.rank() >= min_severity.rank());
            }
            events.sort_by_key(|e| e.timestamp);
            Ok(serde_json::to_value(&events).unwrap_or(Value::Null))
        }
        "infer_network_risk_score" => {
            let include_anomalies = arguments.get("include_anomalies").and_then(Value::as_bool).unwrap_or(true);
            let include_predictions = arguments.get("include_predictions").and_then(Value::as_bool).unwrap_or(true);

            let cutoff = Utc::now() - chrono::Duration::hours(1);
            let events: Vec<_> = state.buffer.snapshot().into_iter().filter(|e| e.timestamp >= cutoff).collect();

            let anomalies = if include_anomalies { anomaly::detect_anomalies(&events, state.anomaly_sensitivity) } else { Vec::new() };
            let predictions = if include_predictions { predictor::predict(&events, &[]) } else { Vec::new() };

            let result = risk::score(&events, &anomalies, &predictions);
            Ok(json!({ "score": result.score, "tier": result.tier }))
        }
        other => Err(GatewayError::RoutingMiss(other.to_string())),
    }
}

fn query_caller_identity(query: &RoleQuery) -> Option<String> {
    query
        .arguments
        .get("caller_identity")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn result_envelope(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_envelope(id: Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}
