//! Access-audit endpoints
//!
//! GET /api/audit/orgsetup-summary — aggregated access statistics.
//! GET /api/audit/orgsetup-filters — raw events sorted ascending.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use tracing::error;

use super::{error_response, json_response};
use crate::audit::{self, ORG_SETUP_SCOPE};
use crate::server::AppState;

pub fn audit_summary(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let entries = state.access_log.snapshot(ORG_SETUP_SCOPE);
    match audit::summarize(&entries) {
        Ok(summary) => json_response(StatusCode::OK, &summary),
        Err(e) => {
            error!(error = %e, "audit summarize failed");
            error_response(&e, state.args.dev_mode)
        }
    }
}

pub fn audit_entries(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let entries = state.access_log.sorted_by_timestamp(ORG_SETUP_SCOPE);
    json_response(StatusCode::OK, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use http_body_util::BodyExt;

    use crate::audit::AccessEvent;
    use crate::config::Args;
    use crate::warehouse::MemoryWarehouse;

    fn state() -> Arc<AppState> {
        let args = Args::parse_from(["dxgate", "--dev-mode", "true"]);
        Arc::new(AppState::new(args, Arc::new(MemoryWarehouse::new())))
    }

    fn event(user: &str, timestamp: &str) -> AccessEvent {
        AccessEvent {
            user_id: user.to_string(),
            timestamp: timestamp.to_string(),
            action: "list_org_setup".to_string(),
            detail: None,
        }
    }

    async fn body_json(
        response: Response<Full<Bytes>>,
    ) -> (hyper::StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_summary_over_recorded_events() {
        let state = state();
        state
            .access_log
            .record(ORG_SETUP_SCOPE, event("a", "2024-01-01T10:00:05"));
        state
            .access_log
            .record(ORG_SETUP_SCOPE, event("b", "2024-01-01T10:00:45"));
        state
            .access_log
            .record(ORG_SETUP_SCOPE, event("a", "2024-01-01T10:01:10"));

        let (status, json) = body_json(audit_summary(&state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_actions"], 3);
        assert_eq!(json["unique_users"], 2);
        assert_eq!(json["actions_per_minute"][0]["timestamp"], "2024-01-01T10:00:00");
        assert_eq!(json["actions_per_minute"][0]["count"], 2);
    }

    #[tokio::test]
    async fn test_summary_of_empty_log() {
        let (status, json) = body_json(audit_summary(&state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_actions"], 0);
        assert_eq!(json["actions_per_minute"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_entry_fails_summary() {
        let state = state();
        state
            .access_log
            .record(ORG_SETUP_SCOPE, event("a", "garbage"));
        let (status, json) = body_json(audit_summary(&state)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "invalid_timestamp");
    }

    #[tokio::test]
    async fn test_entries_sorted_ascending() {
        let state = state();
        state
            .access_log
            .record(ORG_SETUP_SCOPE, event("b", "2024-01-01T10:05:00"));
        state
            .access_log
            .record(ORG_SETUP_SCOPE, event("a", "2024-01-01T10:01:00"));

        let (status, json) = body_json(audit_entries(&state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["user_id"], "a");
        assert_eq!(json[1]["user_id"], "b");
    }
}
