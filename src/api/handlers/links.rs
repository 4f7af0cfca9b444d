//! Handlers for the caller's tracked links.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse, LinkItem, LinkListResponse};
use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::middleware::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a tracked link owned by the authenticated user.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "example.com/article", "tag": "newsletter" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "path": "k3J9aQ0vXc2LmN8pR4tY",
///   "short_url": "https://lnk.example.com/redirect/k3J9aQ0vXc2LmN8pR4tY",
///   "destination": "https://example.com/article",
///   "tag": "newsletter"
/// }
/// ```
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(user.user_id, &payload.url, payload.tag)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            short_url: state.link_service.short_url(&link.path),
            path: link.path,
            destination: link.destination,
            tag: link.tag,
        }),
    ))
}

/// Lists the authenticated user's links with click counts, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=25`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (page, page_size) = params
        .validated()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (links, total_items) = state
        .link_service
        .list_links(user.user_id, page, page_size)
        .await?;

    let items = links
        .into_iter()
        .map(|summary| LinkItem {
            short_url: state.link_service.short_url(&summary.link.path),
            path: summary.link.path,
            destination: summary.link.destination,
            tag: summary.link.tag,
            clicks: summary.clicks,
            created_at: summary.link.created_at,
        })
        .collect();

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta::new(page, page_size, total_items),
        items,
    }))
}
