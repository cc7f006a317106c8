//! Warehouse collaborator
//!
//! The backing analytical store is an opaque synchronous row-returning
//! execution service reached through this trait. Transport and credentials
//! live behind the implementations; the core only sees records or a
//! `BackingService` error. Calls are not retried.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::query::QueryDescriptor;
use crate::rules::OrgSetupRecord;
use crate::types::Result;

pub use http::HttpWarehouse;
pub use memory::MemoryWarehouse;

/// Row-returning execution service over the setup history view
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute a listing query and return its rows
    async fn execute(&self, query: &QueryDescriptor) -> Result<Vec<OrgSetupRecord>>;

    /// Distinct non-null values of one column of the setup view
    ///
    /// Callers pass fixed column names from the facet allow-list, never
    /// request input.
    async fn fetch_distinct(&self, column: &str) -> Result<Vec<serde_json::Value>>;
}
