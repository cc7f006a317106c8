//! Filter criteria validation
//!
//! Raw filter inputs arrive from the transport layer as strings. Validation
//! happens here, before any query is built: non-integer cycle entries are a
//! client error, and the page size is clamped to its documented bound.

use std::collections::BTreeSet;

use crate::types::{ReviewError, Result};

/// Page size applied when the caller does not supply one
pub const DEFAULT_LIMIT: u32 = 500;
/// Smallest accepted page size
pub const MIN_LIMIT: u32 = 1;
/// Largest accepted page size
pub const MAX_LIMIT: u32 = 800;

/// Keyset pagination cursor: the sort key of the last row of the prior page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub last_cycle: i64,
    pub last_org_log: String,
}

/// Validated, immutable filter criteria
///
/// Ordered sets keep the built query a pure function of the criteria:
/// the same input always produces the identical descriptor. Absent or empty
/// sets impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub cycles: BTreeSet<i64>,
    pub org_logs: BTreeSet<String>,
    /// Substring-match semantics, not exact
    pub org_codes: BTreeSet<String>,
    pub engagement_managers: BTreeSet<String>,
    pub aco_analysts: BTreeSet<String>,
    pub limit: u32,
    pub cursor: Option<PageCursor>,
}

/// Unvalidated filter inputs as decoded from the request query string
#[derive(Debug, Clone, Default)]
pub struct RawFilters {
    pub cycles: Vec<String>,
    pub org_logs: Vec<String>,
    pub org_codes: Vec<String>,
    pub engagement_managers: Vec<String>,
    pub aco_analysts: Vec<String>,
    pub limit: Option<String>,
    pub last_cycle: Option<String>,
    pub last_org_log: Option<String>,
}

impl FilterCriteria {
    /// Validate raw inputs into criteria
    ///
    /// Fails with `InvalidFilterValue` on any non-integer cycle or cursor
    /// entry and on an unparseable limit. A cursor is applied only when both
    /// halves are supplied; a lone half imposes no cursor.
    pub fn from_raw(raw: &RawFilters) -> Result<Self> {
        let mut cycles = BTreeSet::new();
        for value in &raw.cycles {
            cycles.insert(parse_int("cycle", value)?);
        }

        let limit = match &raw.limit {
            Some(value) => clamp_limit(parse_int("limit", value)?),
            None => DEFAULT_LIMIT,
        };

        let cursor = match (&raw.last_cycle, &raw.last_org_log) {
            (Some(cycle), Some(org_log)) => Some(PageCursor {
                last_cycle: parse_int("last_dx_cycle", cycle)?,
                last_org_log: org_log.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            cycles,
            org_logs: raw.org_logs.iter().cloned().collect(),
            org_codes: raw.org_codes.iter().cloned().collect(),
            engagement_managers: raw.engagement_managers.iter().cloned().collect(),
            aco_analysts: raw.aco_analysts.iter().cloned().collect(),
            limit,
            cursor,
        })
    }
}

/// Clamp a requested page size into [MIN_LIMIT, MAX_LIMIT]
pub fn clamp_limit(requested: i64) -> u32 {
    requested.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as u32
}

fn parse_int(field: &str, value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        ReviewError::InvalidFilterValue(format!("{} '{}' is not an integer", field, value))
    })
}
