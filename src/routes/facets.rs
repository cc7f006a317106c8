//! Reference-facet endpoints
//!
//! GET /api/filters/{cycle|org-log|org-cd|engmt-manager|aco-analyst}.
//! Values come from the facet cache; an empty list is a valid answer.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use tracing::error;

use super::{error_response, json_response, not_found_response};
use crate::facets::Facet;
use crate::server::AppState;

pub async fn handle_facet(state: &Arc<AppState>, path: &str) -> Response<Full<Bytes>> {
    let segment = path.strip_prefix("/api/filters/").unwrap_or("");
    let Some(facet) = Facet::from_path_segment(segment) else {
        return not_found_response(path);
    };

    match state.facets.get(facet, state.warehouse.as_ref()).await {
        Ok(values) => json_response(StatusCode::OK, &values),
        Err(e) => {
            error!(facet = facet.name(), error = %e, "facet fetch failed");
            error_response(&e, state.args.dev_mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use http_body_util::BodyExt;

    use crate::config::Args;
    use crate::rules::OrgSetupRecord;
    use crate::warehouse::MemoryWarehouse;

    fn state() -> Arc<AppState> {
        let args = Args::parse_from(["dxgate", "--dev-mode", "true"]);
        let records = vec![
            OrgSetupRecord {
                dx_cycle: 7,
                org_log: "A1".to_string(),
                ..Default::default()
            },
            OrgSetupRecord {
                dx_cycle: 3,
                org_log: "A1".to_string(),
                ..Default::default()
            },
        ];
        Arc::new(AppState::new(
            args,
            Arc::new(MemoryWarehouse::with_records(records)),
        ))
    }

    #[tokio::test]
    async fn test_known_facet_returns_values() {
        let state = state();
        let response = handle_facet(&state, "/api/filters/cycle").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!([7, 3]));
    }

    #[tokio::test]
    async fn test_duplicate_org_log_collapses() {
        let state = state();
        let response = handle_facet(&state, "/api/filters/org-log").await;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!(["A1"]));
    }

    #[tokio::test]
    async fn test_unknown_facet_is_not_found() {
        let state = state();
        let response = handle_facet(&state, "/api/filters/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
