//! SendGrid v3 mail-send client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use tracing::debug;

use super::service::{NotifyError, Notifier};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends alerts through the SendGrid HTTP API.
///
/// SendGrid answers `202 Accepted` for queued mail; every other status is a
/// rejection.
pub struct SendGridNotifier {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl SendGridNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_endpoint(SENDGRID_SEND_URL, api_key, from)
    }

    /// Same as [`SendGridNotifier::new`] with a custom endpoint.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    fn payload(&self, recipient: &str, subject: &str, body: &str) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": recipient }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        })
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(recipient, subject, body))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(recipient, "Email accepted by SendGrid");
        Ok(())
    }
}
