//! dxgate - review gateway for data-exchange setup records

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dxgate::{
    config::Args,
    server,
    warehouse::{HttpWarehouse, MemoryWarehouse, Warehouse},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dxgate={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  dxgate - setup review gateway");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" }
    );
    info!("Setup view: {}", args.setup_view);
    match &args.warehouse_url {
        Some(url) => info!("Warehouse: {}", url),
        None => info!("Warehouse: (none, in-memory stand-in)"),
    }
    info!(
        "Facet cache: ttl {}s, max {} entries",
        args.facet_ttl_secs, args.facet_capacity
    );
    info!("======================================");

    // Construct the warehouse collaborator
    let warehouse: Arc<dyn Warehouse> = match &args.warehouse_url {
        Some(url) => {
            let client = HttpWarehouse::new(
                url,
                args.warehouse_token.clone(),
                &args.setup_view,
                Duration::from_millis(args.request_timeout_ms),
            );
            match client {
                Ok(client) => {
                    info!("Warehouse client ready ({})", url);
                    Arc::new(client)
                }
                Err(e) => {
                    error!("Warehouse client setup failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            // validate() only lets this through in dev mode
            warn!("No warehouse configured (dev mode, using in-memory stand-in)");
            Arc::new(MemoryWarehouse::new())
        }
    };

    // Create application state and run the server
    let state = Arc::new(server::AppState::new(args, warehouse));
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
