//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{create_link_handler, list_links_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST /links` - Create a tracked link
/// - `GET  /links` - List the caller's links with click counts (paginated)
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/links", get(list_links_handler).post(create_link_handler))
}
