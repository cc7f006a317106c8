//! Setup record model
//!
//! One row from the backing setup history view. Records are read-only
//! snapshots: the derivation engine never mutates them.

use serde::{Deserialize, Serialize};

/// A single org setup row as returned by the warehouse
///
/// The key block is always present on real rows; the domain code columns are
/// nullable and drive the file-derivation rules. Unknown columns on a row are
/// ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgSetupRecord {
    // Key block, copied unchanged into every derived descriptor
    #[serde(default)]
    pub dx_cycle: i64,
    #[serde(default)]
    pub org_log: String,
    #[serde(default)]
    pub org_cd: String,
    #[serde(default)]
    pub engmt_manager: String,
    #[serde(default)]
    pub aco_analyst: String,

    // Domain code columns, one per file-exchange variant
    #[serde(default)]
    pub claims: Option<String>,
    #[serde(default)]
    pub enroll: Option<String>,
    #[serde(default)]
    pub rx: Option<String>,
    #[serde(default)]
    pub lab: Option<String>,
    #[serde(default)]
    pub case: Option<String>,
    #[serde(default)]
    pub elig6: Option<String>,
    #[serde(default)]
    pub cap: Option<String>,
    #[serde(default)]
    pub claims_xwalk: Option<String>,
    #[serde(default)]
    pub gic: Option<String>,
    #[serde(default)]
    pub dns: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub code: Option<String>,

    // Auxiliary columns consumed by individual rule branches
    #[serde(default)]
    pub incremental: Option<String>,
    #[serde(default, alias = "enroll_del")]
    pub enroll_delimiter: Option<String>,
    #[serde(default)]
    pub elig_ftp_tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_row_with_nulls_and_extras() {
        let row = serde_json::json!({
            "dx_cycle": 7,
            "org_log": "A1",
            "org_cd": "HMO-12",
            "engmt_manager": "R. Vance",
            "aco_analyst": "P. Ortiz",
            "rx": "DHI",
            "claims": null,
            "load_ts": "2024-06-01T00:00:00",
        });
        let record: OrgSetupRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.dx_cycle, 7);
        assert_eq!(record.rx.as_deref(), Some("DHI"));
        assert!(record.claims.is_none());
    }

    #[test]
    fn test_enroll_delimiter_accepts_view_column_name() {
        let row = serde_json::json!({
            "dx_cycle": 1,
            "org_log": "B",
            "enroll": "Y",
            "enroll_del": "|",
        });
        let record: OrgSetupRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.enroll_delimiter.as_deref(), Some("|"));
    }
}
