//! Configuration for dxgate
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// dxgate - review gateway for data-exchange setup records
#[derive(Parser, Debug, Clone)]
#[command(name = "dxgate")]
#[command(about = "HTTP gateway exposing data-exchange setup records for review")]
pub struct Args {
    /// Unique node identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Warehouse query endpoint base URL (POST {sql, params} to <url>/query)
    /// Required in production mode; optional in dev mode (in-memory stand-in)
    #[arg(long, env = "WAREHOUSE_URL")]
    pub warehouse_url: Option<String>,

    /// Bearer token for the warehouse endpoint (optional)
    #[arg(long, env = "WAREHOUSE_TOKEN")]
    pub warehouse_token: Option<String>,

    /// Fully qualified reference view queried for setups and facets
    #[arg(long, env = "SETUP_VIEW", default_value = "vbc_dtxp.org_setup_hist_v")]
    pub setup_view: String,

    /// Enable development mode (warehouse optional, verbose error bodies)
    #[arg(long, env = "DEV_MODE", action = clap::ArgAction::Set, default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Facet cache time-to-live in seconds
    #[arg(long, env = "FACET_TTL_SECS", default_value = "86400")]
    pub facet_ttl_secs: u64,

    /// Facet cache entry-count ceiling (least-recently-used eviction)
    #[arg(long, env = "FACET_CAPACITY", default_value = "100")]
    pub facet_capacity: usize,

    /// Warehouse request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Comma-separated list of allowed CORS origins ("*" for any)
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,
}

impl Args {
    /// Get the list of configured CORS origins
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether any origin is allowed
    pub fn cors_allow_any(&self) -> bool {
        self.cors_origin_list().iter().any(|o| o == "*")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.warehouse_url.is_none() {
            return Err("WAREHOUSE_URL is required in production mode".to_string());
        }

        if self.facet_ttl_secs == 0 {
            return Err("FACET_TTL_SECS must be greater than zero".to_string());
        }

        if self.facet_capacity == 0 {
            return Err("FACET_CAPACITY must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["dxgate", "--dev-mode", "true"])
    }

    #[test]
    fn test_dev_mode_allows_missing_warehouse() {
        let args = base_args();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_warehouse_url() {
        let args = Args::parse_from(["dxgate"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["dxgate", "--warehouse-url", "http://wh:9040"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut args = base_args();
        args.facet_ttl_secs = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_cors_origin_list() {
        let mut args = base_args();
        args.cors_origins = "http://localhost:3000, https://review.example.com".to_string();
        assert_eq!(
            args.cors_origin_list(),
            vec![
                "http://localhost:3000".to_string(),
                "https://review.example.com".to_string()
            ]
        );
        assert!(!args.cors_allow_any());

        args.cors_origins = "*".to_string();
        assert!(args.cors_allow_any());
    }
}
