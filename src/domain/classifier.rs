//! Bot and link-preview classification contract.
//!
//! The redirect pipeline only counts clicks made by people. Chat apps that
//! unfurl links and search crawlers fetch short URLs too, and those visits are
//! told apart here from the request's forwarded client IPs and User-Agent.

use std::net::IpAddr;

/// Request metadata used for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    /// Raw `X-Forwarded-For` header values, in the order they were received.
    pub forwarded_for: Vec<String>,
    pub user_agent: Option<String>,
}

impl RequestSignals {
    pub fn new(forwarded_for: Vec<String>, user_agent: Option<String>) -> Self {
        Self {
            forwarded_for,
            user_agent,
        }
    }

    /// Every parseable client IP found in the forwarded headers.
    ///
    /// A header value may hold a comma separated chain; each entry is trimmed
    /// and entries that are not IP addresses are skipped.
    pub fn forwarded_ips(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.forwarded_for
            .iter()
            .flat_map(|value| value.split(','))
            .filter_map(|entry| entry.trim().parse::<IpAddr>().ok())
    }
}

/// Why a request was classified as automated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatedReason {
    PreviewIp(IpAddr),
    UserAgent { pattern: String },
}

/// Classification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Human,
    Automated(AutomatedReason),
}

impl Verdict {
    pub fn is_automated(&self) -> bool {
        matches!(self, Verdict::Automated(_))
    }
}

/// Errors raised by classifiers and their signature sources.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Failed to read bot signatures from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed bot signatures: {0}")]
    Malformed(String),
}

/// Decides whether a request comes from an automated client.
///
/// Implementations must be side-effect free: classifying the same signals
/// twice yields the same verdict.
#[cfg_attr(test, mockall::automock)]
pub trait BotClassifier: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClassifierError`] only when the classifier itself is broken,
    /// never because of what the request contains.
    fn classify(&self, signals: &RequestSignals) -> Result<Verdict, ClassifierError>;
}
