//! Health check endpoints
//!
//! - /health, /healthz — liveness probe (is the gateway running?)
//! - /ready, /readyz — readiness probe (is a warehouse configured?)
//! - /version — deployment verification
//!
//! Liveness always answers 200 while the process is up. Readiness answers
//! 503 until a warehouse is configured, unless dev mode is on (the in-memory
//! stand-in serves in that case).

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::json_response;
use crate::facets::FacetCacheStats;
use crate::server::AppState;

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    status: &'static str,
    version: &'static str,
    uptime: u64,
    mode: String,
    node_id: String,
    timestamp: String,
    facet_cache: FacetCacheStats,
}

pub fn health_check(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let body = HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        mode: if state.args.dev_mode {
            "development".to_string()
        } else {
            "production".to_string()
        },
        node_id: state.args.node_id.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        facet_cache: state.facets.stats(),
    };
    json_response(StatusCode::OK, &body)
}

pub fn readiness_check(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let ready = state.args.dev_mode || state.args.warehouse_url.is_some();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(
        status,
        &serde_json::json!({
            "ready": ready,
            "warehouse_configured": state.args.warehouse_url.is_some(),
        }),
    )
}

pub fn version_info() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
