//! # Wicket HTTP API Module
//!
//! This module implements the HTTP surface over the dispatch boundary
//! using axum.
//!
//! ## Endpoints
//!
//! - `POST /rpc/{procedure}` - Dispatch one RPC call
//! - `GET /procedures` - List registered procedures
//! - `GET /health` - Health check
//!
//! ## Middleware stack (outer to inner)
//!
//! 1. Tracing - logs all requests
//! 2. CORS - configured origins, localhost-only default
//! 3. Body limit - from `limits.max_body_bytes`
//! 4. Rate limiting - from `limits.rate_per_second` (if enabled)
//!
//! Authorization is NOT an HTTP middleware: it is enforced per
//! procedure inside the dispatch boundary, where it cannot be bypassed
//! by adding a route.

mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
// Re-export handlers and types for integration tests (via `wicket::api::*`)
#[allow(unused_imports)]
pub use handlers::{health_handler, procedures_handler, rpc_handler};
#[allow(unused_imports)]
pub use types::{HealthResponse, ProcedureInfo, ProceduresResponse, RpcSuccess};

use crate::AppError;
use crate::config::AppConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wicket_core::{ContextBuilder, IdentityProvider, Registry};

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the immutable registry, the per-call context
/// builder, and the pipeline deadline. Everything is injected; no
/// process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    /// The immutable procedure registry, shared read-only.
    pub registry: Arc<Registry>,
    /// Builds one context per call, resolving the session once.
    pub context: Arc<ContextBuilder>,
    /// Deadline wrapping the whole per-call pipeline.
    pub request_timeout: Duration,
}

impl AppState {
    /// Assemble state from the registry, the deployment's identity
    /// provider, and config limits.
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        provider: Arc<dyn IdentityProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            registry,
            context: Arc::new(ContextBuilder::new(provider)),
            request_timeout: Duration::from_millis(config.limits.request_timeout_ms),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from the configured origin list.
///
/// - `["*"]`: allows all origins (development mode - use with caution!)
/// - empty: localhost only (restrictive default)
/// - otherwise: exactly the listed origins
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!(
            "CORS: Allowing ALL origins (cors_origins = [\"*\"]). This is insecure for production!"
        );
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|s| {
            let trimmed = s.trim();
            match trimmed.parse::<HeaderValue>() {
                Ok(hv) => {
                    tracing::info!("CORS: Allowing origin: {}", trimmed);
                    Some(hv)
                }
                Err(e) => {
                    tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No valid origins in cors_origins, defaulting to localhost only");
        build_localhost_cors()
    } else {
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let cors = build_cors_layer(&config.http.cors_origins);

    // Check if rate limiting is enabled
    let rate_limit = config.limits.rate_per_second;
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/procedures", get(handlers::procedures_handler))
        .route("/rpc/{procedure}", post(handlers::rpc_handler));

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(
            config.limits.max_body_bytes,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(config: &AppConfig, state: AppState) -> Result<(), AppError> {
    let router = create_router(state, config);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Io(format!("Bind failed on {addr}: {e}")))?;

    tracing::info!("Wicket HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| AppError::Io(format!("Server error: {e}")))
}
