//! Derived file descriptors

use serde::{Deserialize, Serialize};

/// How often a file is expected to be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    Monthly,
    Weekly,
    Daily,
}

/// Whether a delivery is a full replace or an incremental delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refresh {
    Full,
    Incremental,
}

/// One file-operation descriptor derived from a setup record
///
/// Carries the source record's key block unchanged; the remaining fields come
/// from the rule branch that fired for the record's highest-priority domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub cadence: Cadence,
    pub refresh: Refresh,
    pub has_header: bool,
    pub cycle: i64,
    pub org_log: String,
    pub org_cd: String,
    pub engmt_manager: String,
    pub aco_analyst: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_logic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_changes: Option<String>,
}
