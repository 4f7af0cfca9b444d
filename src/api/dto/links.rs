//! DTOs for tracked link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::PaginationMeta;

/// Request to create a tracked link.
///
/// `url` may omit the scheme, in which case HTTPS is assumed.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional label used in click alerts.
    #[validate(length(max = 100, message = "Tag must be at most 100 characters"))]
    pub tag: Option<String>,
}

/// Created link.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub path: String,
    pub short_url: String,
    pub destination: String,
    pub tag: Option<String>,
}

/// Paginated list of the caller's links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkItem>,
}

/// One link with its click count.
#[derive(Debug, Serialize)]
pub struct LinkItem {
    pub path: String,
    pub short_url: String,
    pub destination: String,
    pub tag: Option<String>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}
