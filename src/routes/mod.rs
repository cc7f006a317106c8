//! HTTP routes for dxgate

pub mod audit;
pub mod facets;
pub mod health;
pub mod org_setup;

pub use audit::{audit_entries, audit_summary};
pub use facets::handle_facet;
pub use health::{health_check, readiness_check, version_info};
pub use org_setup::{handle_org_setup, total_files_count};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::types::ReviewError;

/// External status for a core error
pub fn status_for(err: &ReviewError) -> StatusCode {
    match err {
        ReviewError::InvalidFilterValue(_) => StatusCode::BAD_REQUEST,
        ReviewError::EmptyResult => StatusCode::NOT_FOUND,
        ReviewError::InvalidTimestamp(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReviewError::BackingService(_) | ReviewError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON response with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(body) {
        Ok(json) => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(json)))
            .unwrap(),
        Err(e) => {
            error!("response serialization failed: {}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    r#"{"error": "internal serialization error"}"#,
                )))
                .unwrap()
        }
    }
}

/// Error body: kind + human message, status per [`status_for`]
///
/// Backing-service details stay in the logs outside dev mode so query text
/// never leaks to clients.
pub fn error_response(err: &ReviewError, dev_mode: bool) -> Response<Full<Bytes>> {
    let message = match err {
        ReviewError::EmptyResult => "No org setups found".to_string(),
        ReviewError::BackingService(_) if !dev_mode => {
            "backing service failure".to_string()
        }
        other => other.to_string(),
    };
    let body = serde_json::json!({
        "error": err.kind(),
        "message": message,
    });
    json_response(status_for(err), &body)
}

/// Not found response
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });
    json_response(StatusCode::NOT_FOUND, &body)
}

/// CORS preflight response
pub fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}
