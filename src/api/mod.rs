//! HTTP API for NetGuardian
//!
//! Provides:
//! - Scan API (score a network, record the scan)
//! - Health check
//! - Security middleware (rate limiting, body size, headers, request logs)

pub mod middleware;
pub mod scan;

use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware};
use tower_http::trace::TraceLayer;

pub use middleware::{
    RateLimiter, SecurityMiddlewareConfig, SecurityState, body_size_middleware,
    logging_middleware, rate_limit_middleware, security_headers_middleware,
};
pub use scan::{
    ErrorResponse, HealthResponse, ReputationSummary, ScanApiState, ScanJson, ScanResponse,
    create_router, validate_scan_request,
};

/// Scan router wrapped in the security middleware stack.
///
/// Needs `into_make_service_with_connect_info::<SocketAddr>()` for client IPs.
pub fn build_app(scan_state: ScanApiState, security_state: SecurityState) -> Router {
    let max_request_size = security_state.config.max_request_size;

    create_router(scan_state)
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(axum_middleware::from_fn_with_state(
            security_state.clone(),
            body_size_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            security_state.clone(),
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            security_state,
            logging_middleware,
        ))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}
