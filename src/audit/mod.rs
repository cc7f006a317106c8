//! Access-audit log and aggregation
//!
//! The log itself is appended by the route layer when review endpoints are
//! hit; the core only aggregates. Summarization is pure: per-minute buckets
//! over timestamp strings truncated to the minute, ascending, with counts
//! that always sum to the total.

use chrono::Timelike;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::types::{ReviewError, Result};

/// Audit scope covering the org-setup listing endpoints
pub const ORG_SETUP_SCOPE: &str = "orgsetup";

/// One recorded access to a review endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub user_id: String,
    /// ISO-8601, with or without a UTC offset
    pub timestamp: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AccessEvent {
    /// Event stamped with the current UTC time
    pub fn now(user_id: &str, action: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            action: action.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// One minute bucket of the access timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteBucket {
    /// Minute-truncated timestamp string
    pub timestamp: String,
    pub count: u64,
}

/// Aggregated view of an access log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub total_actions: u64,
    pub unique_users: u64,
    /// Ascending by bucket timestamp; counts sum to total_actions
    pub actions_per_minute: Vec<MinuteBucket>,
}

/// Summarize a batch of access events
///
/// Fails on the first malformed timestamp; the caller decides whether to
/// skip the batch or abort. Does not mutate its input.
pub fn summarize(entries: &[AccessEvent]) -> Result<AuditSummary> {
    let mut users: HashSet<&str> = HashSet::new();
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();

    for entry in entries {
        users.insert(entry.user_id.as_str());
        let minute = truncate_to_minute(&entry.timestamp)?;
        *buckets.entry(minute).or_insert(0) += 1;
    }

    Ok(AuditSummary {
        total_actions: entries.len() as u64,
        unique_users: users.len() as u64,
        actions_per_minute: buckets
            .into_iter()
            .map(|(timestamp, count)| MinuteBucket { timestamp, count })
            .collect(),
    })
}

/// Zero the seconds and sub-second components of an ISO-8601 timestamp
fn truncate_to_minute(raw: &str) -> Result<String> {
    // Offset-carrying timestamps keep their offset; naive ones stay naive
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        let truncated = parsed
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| ReviewError::InvalidTimestamp(raw.to_string()))?;
        return Ok(truncated.format("%Y-%m-%dT%H:%M:%S%:z").to_string());
    }

    let parsed: chrono::NaiveDateTime = raw
        .parse()
        .map_err(|_| ReviewError::InvalidTimestamp(raw.to_string()))?;
    let truncated = parsed
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| ReviewError::InvalidTimestamp(raw.to_string()))?;
    Ok(truncated.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// In-process, scope-keyed access log
///
/// Holds the events the route layer records; nothing is persisted. Snapshots
/// are copies, so aggregation never races an append.
#[derive(Default)]
pub struct AccessLog {
    scopes: DashMap<String, Vec<AccessEvent>>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, scope: &str, event: AccessEvent) {
        self.scopes.entry(scope.to_string()).or_default().push(event);
    }

    /// Copy of the scope's events in append order
    pub fn snapshot(&self, scope: &str) -> Vec<AccessEvent> {
        self.scopes
            .get(scope)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Copy of the scope's events sorted ascending by timestamp
    pub fn sorted_by_timestamp(&self, scope: &str) -> Vec<AccessEvent> {
        let mut entries = self.snapshot(scope);
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        entries
    }
}
