//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling; each accepted
//! connection is served on its own task, so a slow warehouse call never
//! blocks unrelated requests. Routing is a plain match over method and path.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::audit::AccessLog;
use crate::config::Args;
use crate::facets::{Clock, FacetCache, FacetCacheConfig, SystemClock};
use crate::routes;
use crate::types::Result;
use crate::warehouse::Warehouse;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub warehouse: Arc<dyn Warehouse>,
    pub facets: Arc<FacetCache>,
    pub access_log: Arc<AccessLog>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, warehouse: Arc<dyn Warehouse>) -> Self {
        Self::with_clock(args, warehouse, Arc::new(SystemClock))
    }

    /// State with an explicit cache time source (tests)
    pub fn with_clock(args: Args, warehouse: Arc<dyn Warehouse>, clock: Arc<dyn Clock>) -> Self {
        let facets = Arc::new(FacetCache::new(
            FacetCacheConfig {
                ttl: std::time::Duration::from_secs(args.facet_ttl_secs),
                max_entries: args.facet_capacity,
            },
            clock,
        ));
        Self {
            args,
            warehouse,
            facets,
            access_log: Arc::new(AccessLog::new()),
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "dxgate listening on {} as node {}",
        state.args.listen, state.args.node_id
    );
    info!(
        "Facet cache enabled (ttl {}s, max {} entries)",
        state.args.facet_ttl_secs, state.args.facet_capacity
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());
    let origin = req
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    info!("[{}] {} {}", addr, method, path);

    let response = if method == Method::OPTIONS {
        routes::preflight_response()
    } else {
        match (method, path.as_str()) {
            // Liveness probe
            (Method::GET, "/health") | (Method::GET, "/healthz") => {
                routes::health_check(&state)
            }

            // Readiness probe
            (Method::GET, "/ready") | (Method::GET, "/readyz") => {
                routes::readiness_check(&state)
            }

            // Version info for deployment verification
            (Method::GET, "/version") => routes::version_info(),

            // Paginated org setup listing
            (Method::GET, "/api/org-setup") | (Method::GET, "/api/org-setup/") => {
                routes::handle_org_setup(&state, query.as_deref(), user_id.as_deref()).await
            }

            (Method::GET, "/api/org-setup/total-files-count") => routes::total_files_count(),

            // Cached reference-facet values
            (Method::GET, p) if p.starts_with("/api/filters/") => {
                routes::handle_facet(&state, p).await
            }

            // Access-audit views
            (Method::GET, "/api/audit/orgsetup-summary") => routes::audit_summary(&state),
            (Method::GET, "/api/audit/orgsetup-filters") => routes::audit_entries(&state),

            _ => routes::not_found_response(&path),
        }
    };

    Ok(apply_cors(response, &state.args, origin.as_deref()))
}

/// Attach the Access-Control-Allow-Origin header per configuration
///
/// "*" allows any caller; otherwise the request origin is echoed back only
/// when it is on the configured list.
fn apply_cors(
    mut response: Response<Full<Bytes>>,
    args: &Args,
    origin: Option<&str>,
) -> Response<Full<Bytes>> {
    let allow = if args.cors_allow_any() {
        Some("*".to_string())
    } else {
        origin
            .filter(|o| args.cors_origin_list().iter().any(|allowed| allowed == o))
            .map(|o| o.to_string())
    };

    if let Some(allow) = allow {
        if let Ok(value) = allow.parse() {
            response
                .headers_mut()
                .insert("Access-Control-Allow-Origin", value);
        }
    }
    response
}
