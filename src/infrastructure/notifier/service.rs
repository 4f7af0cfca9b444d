//! Notifier trait and error types.

use async_trait::async_trait;

/// Why an outbound message was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Email transport error: {0}")]
    Transport(String),

    #[error("Email rejected by provider with status {status}")]
    Rejected { status: u16 },
}

/// Outbound email used for click alerts.
///
/// The contract is accept or reject; delivery happens outside the service.
///
/// # Implementations
///
/// - [`crate::infrastructure::notifier::SendGridNotifier`] - SendGrid v3 HTTP API
/// - [`crate::infrastructure::notifier::LogNotifier`] - Writes messages to the log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hands one plain-text email to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the transport fails or refuses the message.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}
