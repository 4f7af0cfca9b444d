//! Repository trait for append-only click events.

use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recording clicks.
///
/// Clicks are only ever appended. There is no counter column to update, so
/// concurrent clicks on the same link cannot lose counts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click event for a link.
    ///
    /// # Returns
    ///
    /// The link's click count *after* this append. Two concurrent appends on
    /// the same link never return the same value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the click could not be stored.
    async fn append_click(&self, link_id: i64) -> Result<i64, AppError>;
}
