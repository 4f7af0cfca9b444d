//! Click alert policy.
//!
//! Link owners get an email for each of the first `max_alerts` human clicks on
//! a link. The alert for the last click in that budget says so and tells the
//! owner where to ask for more. A budget of zero disables alerts entirely.
//!
//! Evaluation is pure; sending the message is the caller's job.

use crate::domain::entities::TrackingRecord;

/// A rendered click alert ready to be handed to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// True when this is the final alert in the link's budget.
    pub is_last: bool,
}

/// Process-wide alert budget and the text needed to render alerts.
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    max_alerts: u32,
    short_url_base: String,
    contact_email: String,
}

impl AlertPolicy {
    /// Creates a policy.
    ///
    /// `short_url_base` is the public prefix short paths are appended to,
    /// e.g. `https://lnk.example.com/redirect`.
    pub fn new(
        max_alerts: u32,
        short_url_base: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            max_alerts,
            short_url_base: short_url_base.into().trim_end_matches('/').to_string(),
            contact_email: contact_email.into(),
        }
    }

    /// Decides whether the click that brought the link to `clicks` total
    /// clicks must trigger an alert, and renders it if so.
    ///
    /// `clicks` must be the count returned by the click append that this
    /// visit performed, so that concurrent visits never both claim the same
    /// position in the budget.
    pub fn evaluate(&self, record: &TrackingRecord, clicks: i64) -> Option<AlertMessage> {
        if self.max_alerts == 0 || clicks < 1 || clicks > i64::from(self.max_alerts) {
            return None;
        }

        let is_last = clicks == i64::from(self.max_alerts);

        let mut body = match record.display_tag() {
            Some(tag) => format!(
                "Your LinkUp link tagged '{}' has just been clicked for the {} time!",
                tag,
                ordinal(clicks)
            ),
            None => format!(
                "Your LinkUp link {} to {} has just been clicked for the {} time!",
                self.short_url(&record.path),
                record.destination,
                ordinal(clicks)
            ),
        };

        if is_last {
            body.push_str(&format!(
                "\n\nThis is the last alert you'll receive for this link. \
                 To receive more alerts, contact {}.",
                self.contact_email
            ));
        }

        Some(AlertMessage {
            recipient: record.owner_email.clone(),
            subject: format!("LinkUp link #{} clicked", record.link_id),
            body,
            is_last,
        })
    }

    /// Full public URL of a short path.
    pub fn short_url(&self, path: &str) -> String {
        format!("{}/{}", self.short_url_base, path)
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st, ...
pub fn ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
