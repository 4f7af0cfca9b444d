//! Notifier that only logs.

use async_trait::async_trait;
use tracing::info;

use super::service::{NotifyError, Notifier};

/// Writes alerts to the log instead of sending them.
///
/// Selected when `SENDGRID_API_KEY` is not configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(recipient, subject, body, "Email alert (delivery disabled)");
        Ok(())
    }
}
