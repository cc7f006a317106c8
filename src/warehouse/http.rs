//! HTTP warehouse client
//!
//! Posts parameterized queries to the warehouse's REST execution endpoint.
//! The endpoint accepts `{sql, params}` and answers `{rows: [...]}` with one
//! JSON object per row. No retries, no backoff: a failed call surfaces as a
//! `BackingService` error and the caller decides what to tell the client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::Warehouse;
use crate::query::{ParamValue, QueryDescriptor, QueryParam};
use crate::rules::OrgSetupRecord;
use crate::types::{ReviewError, Result};

pub struct HttpWarehouse {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    view: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Vec<serde_json::Value>,
}

impl HttpWarehouse {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        view: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReviewError::BackingService(format!("client setup failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            view: view.to_string(),
        })
    }

    async fn post_query(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<serde_json::Value>> {
        let payload = serde_json::json!({
            "sql": sql,
            "params": wire_params(params),
        });

        let mut request = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!(params = params.len(), "posting warehouse query");
        let response = request
            .send()
            .await
            .map_err(|e| ReviewError::BackingService(format!("warehouse call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::BackingService(format!(
                "warehouse returned {}",
                status
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| ReviewError::BackingService(format!("malformed warehouse reply: {}", e)))?;
        Ok(body.rows)
    }
}

#[async_trait]
impl Warehouse for HttpWarehouse {
    async fn execute(&self, query: &QueryDescriptor) -> Result<Vec<OrgSetupRecord>> {
        let rows = self.post_query(&query.sql, &query.params).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| ReviewError::BackingService(format!("malformed row: {}", e)))
            })
            .collect()
    }

    async fn fetch_distinct(&self, column: &str) -> Result<Vec<serde_json::Value>> {
        let sql = format!("SELECT DISTINCT {} FROM `{}`", column, self.view);
        let rows = self.post_query(&sql, &[]).await?;
        Ok(rows
            .into_iter()
            .map(|row| distinct_cell(row, column))
            .collect())
    }
}

/// Typed wire form of the bound parameters
fn wire_params(params: &[QueryParam]) -> Vec<serde_json::Value> {
    params
        .iter()
        .map(|p| match &p.value {
            ParamValue::Int(v) => serde_json::json!({
                "name": p.name,
                "type": "INT64",
                "value": v,
            }),
            ParamValue::Str(v) => serde_json::json!({
                "name": p.name,
                "type": "STRING",
                "value": v,
            }),
        })
        .collect()
}

/// Pull the facet column's cell out of a distinct-query row
fn distinct_cell(row: serde_json::Value, column: &str) -> serde_json::Value {
    match row {
        serde_json::Value::Object(mut map) => {
            map.remove(column).unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_params_carry_types() {
        let params = vec![
            QueryParam {
                name: "p0".to_string(),
                value: ParamValue::Int(42),
            },
            QueryParam {
                name: "p1".to_string(),
                value: ParamValue::Str("%HMO%".to_string()),
            },
        ];
        let wire = wire_params(&params);
        assert_eq!(wire[0]["type"], "INT64");
        assert_eq!(wire[0]["value"], 42);
        assert_eq!(wire[1]["type"], "STRING");
        assert_eq!(wire[1]["value"], "%HMO%");
    }

    #[test]
    fn test_distinct_cell_extraction() {
        let row = serde_json::json!({"org_log": "A1"});
        assert_eq!(distinct_cell(row, "org_log"), serde_json::json!("A1"));

        // A row without the column reads as null and gets filtered upstream
        let row = serde_json::json!({"other": 1});
        assert_eq!(distinct_cell(row, "org_log"), serde_json::Value::Null);

        // Bare scalar rows pass through
        assert_eq!(distinct_cell(serde_json::json!(7), "dx_cycle"), serde_json::json!(7));
    }
}
