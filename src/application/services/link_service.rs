//! Tracked link creation and listing.

use std::sync::Arc;

use crate::domain::entities::{Link, LinkSummary, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::path_generator::generate_path;
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

const MAX_PATH_ATTEMPTS: usize = 10;

/// Service for creating and listing a user's tracked links.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    path_length: usize,
    short_url_base: String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `short_url_base` is the public redirect prefix, e.g.
    /// `https://lnk.example.com/redirect`.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        path_length: usize,
        short_url_base: impl Into<String>,
    ) -> Self {
        Self {
            link_repository,
            path_length,
            short_url_base: short_url_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a tracked link owned by `user_id`.
    ///
    /// The destination is normalized (scheme-less input becomes HTTPS) and a
    /// random path is generated. A path collision is retried with a fresh
    /// path up to 10 times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the destination is not a valid
    /// HTTP(S) URL, and [`AppError::Internal`] when no free path was found.
    pub async fn create_link(
        &self,
        user_id: i64,
        url: &str,
        tag: Option<String>,
    ) -> Result<Link, AppError> {
        let destination = normalize_url(url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let tag = tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        for attempt in 1..=MAX_PATH_ATTEMPTS {
            let new_link = NewLink {
                path: generate_path(self.path_length),
                destination: destination.clone(),
                user_id,
                tag: tag.clone(),
            };

            match self.link_repository.create(new_link).await {
                Ok(link) => {
                    tracing::info!(link_id = link.id, user_id, path = %link.path, "Link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    tracing::warn!(attempt, "Short path collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique path",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Returns one page of the user's links, newest first, with the total count.
    ///
    /// `page` is 1-based.
    pub async fn list_links(
        &self,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<LinkSummary>, i64), AppError> {
        let limit = i64::from(page_size);
        let offset = i64::from(page.saturating_sub(1)) * limit;

        let links = self
            .link_repository
            .list_by_owner(user_id, offset, limit)
            .await?;
        let total = self.link_repository.count_by_owner(user_id).await?;

        Ok((links, total))
    }

    /// Verifies the link store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.link_repository.health_check().await
    }

    /// Full public URL of a short path.
    pub fn short_url(&self, path: &str) -> String {
        format!("{}/{}", self.short_url_base, path)
    }
}
