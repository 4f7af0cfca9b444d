//! Outbound email for click alerts.

mod log_notifier;
mod sendgrid;
mod service;

pub use log_notifier::LogNotifier;
pub use sendgrid::SendGridNotifier;
pub use service::{NotifyError, Notifier};

#[cfg(test)]
pub use service::MockNotifier;
