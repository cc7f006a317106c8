//! Org setup listing endpoint
//!
//! GET /api/org-setup with repeatable filter params and a keyset cursor.
//! The flow is: parse and validate filters, build the parameterized listing
//! query, execute through the warehouse, derive file descriptors per record,
//! return a bounded page. Each successful listing is recorded in the access
//! log for the audit endpoints.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use super::{error_response, json_response};
use crate::audit::{AccessEvent, ORG_SETUP_SCOPE};
use crate::query::{self, FilterCriteria, RawFilters};
use crate::rules::{self, FileDescriptor};
use crate::server::AppState;
use crate::types::ReviewError;

/// Page of derived file descriptors
#[derive(Serialize)]
struct PaginatedOrgSetup {
    data: Vec<FileDescriptor>,
    total: usize,
    limit: u32,
}

pub async fn handle_org_setup(
    state: &Arc<AppState>,
    query_string: Option<&str>,
    user_id: Option<&str>,
) -> Response<Full<Bytes>> {
    let raw = parse_query(query_string.unwrap_or(""));
    let criteria = match FilterCriteria::from_raw(&raw) {
        Ok(criteria) => criteria,
        Err(e) => return error_response(&e, state.args.dev_mode),
    };

    let descriptor = query::build(&state.args.setup_view, &criteria);
    debug!(sql = %descriptor.sql, params = descriptor.params.len(), "executing listing query");

    let records = match state.warehouse.execute(&descriptor).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "listing query failed");
            return error_response(&e, state.args.dev_mode);
        }
    };

    if records.is_empty() {
        return error_response(&ReviewError::EmptyResult, state.args.dev_mode);
    }

    let data: Vec<FileDescriptor> = records.iter().flat_map(rules::derive).collect();

    state.access_log.record(
        ORG_SETUP_SCOPE,
        AccessEvent::now(user_id.unwrap_or("anonymous"), "list_org_setup"),
    );

    let page = PaginatedOrgSetup {
        total: data.len(),
        limit: criteria.limit,
        data,
    };
    json_response(StatusCode::OK, &page)
}

/// GET /api/org-setup/total-files-count
///
/// Placeholder figure, not backed by an aggregation.
/// TODO: replace with a real COUNT over the setup view once the warehouse
/// endpoint exposes one.
pub fn total_files_count() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!(150_000))
}

/// Decode the request query string into raw filter inputs
///
/// Repeated keys accumulate; unknown keys are ignored; for single-valued
/// keys the last occurrence wins.
fn parse_query(query: &str) -> RawFilters {
    let mut raw = RawFilters::default();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(key);
        let value = decode(value);
        match key.as_str() {
            "cycle" => raw.cycles.push(value),
            "org_log" => raw.org_logs.push(value),
            "org_cd" => raw.org_codes.push(value),
            "engmt_manager" => raw.engagement_managers.push(value),
            "aco_analyst" => raw.aco_analysts.push(value),
            "limit" => raw.limit = Some(value),
            "last_dx_cycle" => raw.last_cycle = Some(value),
            "last_org_log" => raw.last_org_log = Some(value),
            _ => {}
        }
    }
    raw
}

fn decode(part: &str) -> String {
    let part = part.replace('+', " ");
    urlencoding::decode(&part)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(part)
}
