//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::utils::db_error::is_safe_to_retry;

const MAX_TRANSIENT_RETRIES: usize = 5;

/// Append-only click storage.
///
/// Appends on one link are serialized by a transaction-scoped advisory lock
/// keyed on the link id, so each append reads the committed `MAX(seq)` of
/// every earlier append and the next `seq` is never contended. Appends on
/// different links do not wait on each other. The `(link_id, seq)` unique
/// constraint still backs the invariant at the schema level.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn insert_next(&self, link_id: i64) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Released on commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(link_id)
            .execute(&mut *tx)
            .await?;

        let seq = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO link_clicks (link_id, seq)
            SELECT $1, COALESCE(MAX(seq), 0) + 1
            FROM link_clicks
            WHERE link_id = $1
            RETURNING seq
            "#,
        )
        .bind(link_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(seq)
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn append_click(&self, link_id: i64) -> Result<i64, AppError> {
        let strategy = ExponentialBackoff::from_millis(5)
            .max_delay(Duration::from_millis(200))
            .map(jitter)
            .take(MAX_TRANSIENT_RETRIES);

        let seq = RetryIf::spawn(
            strategy,
            || self.insert_next(link_id),
            |e: &sqlx::Error| {
                let retry = is_safe_to_retry(e);
                if retry {
                    tracing::warn!(link_id, error = %e, "Click append rolled back, retrying");
                }
                retry
            },
        )
        .await?;

        Ok(seq)
    }
}
