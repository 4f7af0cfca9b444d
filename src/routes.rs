//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET  /redirect/{path}` - Short link redirect (public)
//! - `GET  /redirect`        - Missing path, sent to the error page (public)
//! - `GET  /health`          - Health check: DB, cache, visit queue (public)
//! - `/api/*`                - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api`
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, missing_path_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// `behind_proxy` switches the API rate limiter from the peer socket address
/// to the forwarded client IP; enable it only behind a trusted reverse proxy.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let api_router = if behind_proxy {
        protected.layer(rate_limit::proxy_layer())
    } else {
        protected.layer(rate_limit::layer())
    };

    let router = Router::new()
        .route("/redirect/{path}", get(redirect_handler))
        .route("/redirect", get(missing_path_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
