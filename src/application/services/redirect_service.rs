//! Short path resolution for the redirect hot path.

use std::sync::Arc;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Why a short path could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Short path not found")]
    NotFound,

    #[error("Link store unavailable: {0}")]
    Unavailable(#[source] AppError),
}

/// Resolves short paths to destinations, cache first.
///
/// A cache failure falls back to the store. A store hit is written back to
/// the cache on a detached task so the redirect does not wait for it.
pub struct RedirectService {
    link_repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl RedirectService {
    pub fn new(link_repository: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            link_repository,
            cache,
        }
    }

    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] for empty or unknown paths and
    /// [`ResolveError::Unavailable`] when the store fails.
    pub async fn resolve_destination(&self, path: &str) -> Result<String, ResolveError> {
        if path.is_empty() {
            return Err(ResolveError::NotFound);
        }

        match self.cache.get_destination(path).await {
            Ok(Some(destination)) => return Ok(destination),
            Ok(None) => {}
            Err(e) => tracing::warn!(path, error = %e, "Cache lookup failed, using store"),
        }

        let destination = self
            .link_repository
            .resolve_destination(path)
            .await
            .map_err(ResolveError::Unavailable)?
            .ok_or(ResolveError::NotFound)?;

        let cache = self.cache.clone();
        let cache_path = path.to_string();
        let cache_destination = destination.clone();
        tokio::spawn(async move {
            if let Err(e) = cache
                .set_destination(&cache_path, &cache_destination, None)
                .await
            {
                tracing::warn!(path = %cache_path, error = %e, "Failed to cache destination");
            }
        });

        Ok(destination)
    }
}
