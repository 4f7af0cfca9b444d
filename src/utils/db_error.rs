//! Database error classification helpers.

/// SQLSTATE `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// True when the statement certainly did not commit and can be run again:
/// no connection was ever acquired, or PostgreSQL rolled the transaction back
/// to break a conflict.
///
/// I/O errors are excluded: the connection may have dropped after `COMMIT`
/// reached the server.
pub fn is_safe_to_retry(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}
