//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Link, LinkSummary, NewLink, TrackingRecord};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    path: String,
    destination: String,
    user_id: i64,
    tag: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(r.id, r.path, r.destination, r.user_id, r.tag, r.created_at)
    }
}

#[derive(FromRow)]
struct LinkSummaryRow {
    #[sqlx(flatten)]
    link: LinkRow,
    clicks: i64,
}

#[derive(FromRow)]
struct TrackingRow {
    link_id: i64,
    path: String,
    destination: String,
    owner_email: String,
    tag: Option<String>,
    clicks_before: i64,
}

impl From<TrackingRow> for TrackingRecord {
    fn from(r: TrackingRow) -> Self {
        TrackingRecord {
            link_id: r.link_id,
            path: r.path,
            destination: r.destination,
            owner_email: r.owner_email,
            tag: r.tag,
            clicks_before: r.clicks_before,
        }
    }
}

/// PostgreSQL repository for links.
///
/// All lookups used by the redirect pipeline are read-only.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (path, destination, user_id, tag)
            VALUES ($1, $2, $3, $4)
            RETURNING id, path, destination, user_id, tag, created_at
            "#,
        )
        .bind(&new_link.path)
        .bind(&new_link.destination)
        .bind(new_link.user_id)
        .bind(&new_link.tag)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn resolve_destination(&self, path: &str) -> Result<Option<String>, AppError> {
        let destination =
            sqlx::query_scalar::<_, String>("SELECT destination FROM links WHERE path = $1")
                .bind(path)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(destination)
    }

    async fn fetch_tracking_record(
        &self,
        path: &str,
    ) -> Result<Option<TrackingRecord>, AppError> {
        let row = sqlx::query_as::<_, TrackingRow>(
            r#"
            SELECT
                l.id AS link_id,
                l.path,
                l.destination,
                u.email AS owner_email,
                l.tag,
                (SELECT COUNT(*) FROM link_clicks c WHERE c.link_id = l.id) AS clicks_before
            FROM links l
            JOIN users u ON u.id = l.user_id
            WHERE l.path = $1
            "#,
        )
        .bind(path)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LinkSummary>, AppError> {
        let rows = sqlx::query_as::<_, LinkSummaryRow>(
            r#"
            SELECT
                l.id, l.path, l.destination, l.user_id, l.tag, l.created_at,
                COALESCE(c.clicks, 0) AS clicks
            FROM links l
            LEFT JOIN (
                SELECT link_id, COUNT(*) AS clicks
                FROM link_clicks
                GROUP BY link_id
            ) c ON c.link_id = l.id
            WHERE l.user_id = $1
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkSummary {
                link: r.link.into(),
                clicks: r.clicks,
            })
            .collect())
    }

    async fn count_by_owner(&self, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
