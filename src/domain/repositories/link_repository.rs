//! Repository trait for tracked link data access.

use crate::domain::entities::{Link, LinkSummary, NewLink, TrackingRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for tracked links.
///
/// The two redirect lookups are deliberately separate queries:
/// [`resolve_destination`](Self::resolve_destination) runs before the redirect
/// and selects a single column, while
/// [`fetch_tracking_record`](Self::fetch_tracking_record) joins the owner and
/// counts clicks after the caller has already been redirected.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new tracked link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the path already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Looks up the destination URL for a short path.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` if the path exists
    /// - `Ok(None)` if it does not
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the store is unavailable.
    async fn resolve_destination(&self, path: &str) -> Result<Option<String>, AppError>;

    /// Fetches the full tracking record for a short path, including the owner's
    /// email and the number of clicks recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn fetch_tracking_record(&self, path: &str)
    -> Result<Option<TrackingRecord>, AppError>;

    /// Lists a user's links, newest first, with their click counts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_owner(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LinkSummary>, AppError>;

    /// Counts a user's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_by_owner(&self, user_id: i64) -> Result<i64, AppError>;

    /// Checks that the backing store answers queries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
