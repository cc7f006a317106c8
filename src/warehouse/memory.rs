//! In-memory warehouse stand-in
//!
//! Dev-mode and test double over a fixed record set. It honors only the row
//! bound of a query descriptor; predicate evaluation belongs to the real
//! warehouse and is not reimplemented here.

use async_trait::async_trait;
use std::collections::HashSet;

use super::Warehouse;
use crate::query::QueryDescriptor;
use crate::rules::OrgSetupRecord;
use crate::types::{ReviewError, Result};

#[derive(Default)]
pub struct MemoryWarehouse {
    records: Vec<OrgSetupRecord>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<OrgSetupRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn execute(&self, query: &QueryDescriptor) -> Result<Vec<OrgSetupRecord>> {
        Ok(self
            .records
            .iter()
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_distinct(&self, column: &str) -> Result<Vec<serde_json::Value>> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for record in &self.records {
            let value = match column {
                "dx_cycle" => serde_json::json!(record.dx_cycle),
                "org_log" => serde_json::json!(record.org_log),
                "org_cd" => serde_json::json!(record.org_cd),
                "engmt_manager" => serde_json::json!(record.engmt_manager),
                "aco_analyst" => serde_json::json!(record.aco_analyst),
                other => {
                    return Err(ReviewError::BackingService(format!(
                        "unknown facet column: {}",
                        other
                    )))
                }
            };
            if seen.insert(value.to_string()) {
                values.push(value);
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build, FilterCriteria};

    fn records() -> Vec<OrgSetupRecord> {
        vec![
            OrgSetupRecord {
                dx_cycle: 7,
                org_log: "A1".to_string(),
                ..Default::default()
            },
            OrgSetupRecord {
                dx_cycle: 7,
                org_log: "B2".to_string(),
                ..Default::default()
            },
            OrgSetupRecord {
                dx_cycle: 3,
                org_log: "A1".to_string(),
                ..Default::default()
            },
        ]
    }

    #[tokio::test]
    async fn test_execute_honors_row_bound() {
        let warehouse = MemoryWarehouse::with_records(records());
        let criteria = FilterCriteria {
            limit: 2,
            ..Default::default()
        };
        let rows = warehouse
            .execute(&build("view", &criteria))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_deduplicates_in_first_seen_order() {
        let warehouse = MemoryWarehouse::with_records(records());
        let cycles = warehouse.fetch_distinct("dx_cycle").await.unwrap();
        assert_eq!(cycles, vec![serde_json::json!(7), serde_json::json!(3)]);

        let logs = warehouse.fetch_distinct("org_log").await.unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_column_is_an_error() {
        let warehouse = MemoryWarehouse::new();
        assert!(warehouse.fetch_distinct("password").await.is_err());
    }
}
