//! Link entity representing a tracked short path.

use chrono::{DateTime, Utc};

/// A tracked link owned by exactly one user.
///
/// The short `path` is globally unique and immutable once created. The
/// destination is set at creation and is never touched by click tracking.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub path: String,
    pub destination: String,
    pub user_id: i64,
    pub tag: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        path: String,
        destination: String,
        user_id: i64,
        tag: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            path,
            destination,
            user_id,
            tag,
            created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub path: String,
    pub destination: String,
    pub user_id: i64,
    pub tag: Option<String>,
}

/// A link together with its derived click count.
#[derive(Debug, Clone)]
pub struct LinkSummary {
    pub link: Link,
    pub clicks: i64,
}

/// Everything the tracking pipeline needs about a link, fetched after the
/// redirect has been issued.
///
/// `clicks_before` is informational only: alert decisions use the count
/// returned by the click append, never this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRecord {
    pub link_id: i64,
    pub path: String,
    pub destination: String,
    pub owner_email: String,
    pub tag: Option<String>,
    pub clicks_before: i64,
}

impl TrackingRecord {
    /// Returns the tag if it is set and not blank.
    pub fn display_tag(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}
