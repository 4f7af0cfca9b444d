//! Handler for short URL redirects.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use metrics::counter;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::services::ResolveError;
use crate::domain::visit::Visit;
use crate::state::AppState;
use crate::utils::request_signals::signals_from_headers;

/// Redirects a short path to its destination.
///
/// # Endpoint
///
/// `GET /redirect/{path}`
///
/// # Request Flow
///
/// 1. Resolve the destination (cache, then database)
/// 2. Queue the visit for the background tracking worker with `try_send`
/// 3. Return `307 Temporary Redirect`
///
/// The request task never waits on tracking. The worker may pick the visit up
/// before the response is written, so tracking can start earlier than the
/// redirect reaches the client, but no tracking outcome changes the
/// response. If the visit queue is full or closed the visit is dropped and
/// the redirect still succeeds.
///
/// Unknown paths and store failures redirect to the configured error page.
pub async fn redirect_handler(
    Path(path): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Redirect {
    let destination = match state.redirect_service.resolve_destination(&path).await {
        Ok(destination) => destination,
        Err(ResolveError::NotFound) => {
            tracing::debug!(path = %path, "Unknown short path");
            return Redirect::temporary(&state.error_redirect_url);
        }
        Err(e @ ResolveError::Unavailable(_)) => {
            tracing::error!(path = %path, error = %e, "Failed to resolve short path");
            return Redirect::temporary(&state.error_redirect_url);
        }
    };

    let visit = Visit::new(path, signals_from_headers(&headers));

    if let Err(e) = state.visit_sender.try_send(visit) {
        counter!("linkup_visits_dropped_total").increment(1);
        match e {
            TrySendError::Full(visit) => {
                tracing::warn!(path = %visit.path, "Visit queue full, visit not tracked")
            }
            TrySendError::Closed(visit) => {
                tracing::warn!(path = %visit.path, "Visit queue closed, visit not tracked")
            }
        }
    }

    Redirect::temporary(&destination)
}

/// `GET /redirect` with no path.
pub async fn missing_path_handler(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.error_redirect_url)
}
