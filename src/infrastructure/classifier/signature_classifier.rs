//! Signature-based bot classifier.

use ipnetwork::IpNetwork;
use regex::RegexSet;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::classifier::{
    AutomatedReason, BotClassifier, ClassifierError, RequestSignals, Verdict,
};

/// IP ranges of known link-preview fetchers.
///
/// LinkedIn fetches message previews from these addresses with a browser
/// User-Agent, so they can only be recognised by IP.
pub const DEFAULT_PREVIEW_IP_RANGES: &[&str] = &["172.176.75.89/32", "52.165.149.97/32"];

/// One entry of a `crawler-user-agents.json` style signature file.
///
/// Fields other than `pattern` (`url`, `instances`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct Signature {
    pattern: String,
}

/// Classifies requests against a fixed preview-IP deny-list and an ordered
/// list of User-Agent patterns.
///
/// Built once at startup and shared read-only; classification never fails.
#[derive(Debug)]
pub struct SignatureClassifier {
    preview_ranges: Vec<IpNetwork>,
    patterns: Vec<String>,
    pattern_set: RegexSet,
}

impl SignatureClassifier {
    /// Builds a classifier from IP ranges (CIDR or bare addresses) and
    /// User-Agent regex patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Malformed`] if any range or pattern does not parse.
    pub fn new<S: AsRef<str>>(
        preview_ranges: &[S],
        patterns: Vec<String>,
    ) -> Result<Self, ClassifierError> {
        let preview_ranges = preview_ranges
            .iter()
            .map(|range| {
                let range = range.as_ref().trim();
                range.parse::<IpNetwork>().map_err(|e| {
                    ClassifierError::Malformed(format!("invalid IP range '{}': {}", range, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pattern_set = RegexSet::new(&patterns)
            .map_err(|e| ClassifierError::Malformed(format!("invalid User-Agent pattern: {}", e)))?;

        Ok(Self {
            preview_ranges,
            patterns,
            pattern_set,
        })
    }

    /// Parses a JSON signature list: `[{ "pattern": "..." }, ...]`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Malformed`] on invalid JSON, an empty list,
    /// or an invalid pattern or range.
    pub fn from_json<S: AsRef<str>>(
        json: &str,
        preview_ranges: &[S],
    ) -> Result<Self, ClassifierError> {
        let signatures: Vec<Signature> = serde_json::from_str(json)
            .map_err(|e| ClassifierError::Malformed(format!("invalid signature JSON: {}", e)))?;

        if signatures.is_empty() {
            return Err(ClassifierError::Malformed(
                "signature list is empty".to_string(),
            ));
        }

        let patterns = signatures.into_iter().map(|s| s.pattern).collect();

        Self::new(preview_ranges, patterns)
    }

    /// Loads the signature list from disk.
    ///
    /// The built-in [`DEFAULT_PREVIEW_IP_RANGES`] are always included;
    /// `extra_ranges` are appended after them.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Io`] if the file cannot be read and
    /// [`ClassifierError::Malformed`] if its content is invalid.
    pub fn load(path: impl AsRef<Path>, extra_ranges: &[String]) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let ranges: Vec<&str> = DEFAULT_PREVIEW_IP_RANGES
            .iter()
            .copied()
            .chain(extra_ranges.iter().map(String::as_str))
            .collect();

        let classifier = Self::from_json(&json, ranges.as_slice())?;

        info!(
            path = %path.display(),
            patterns = classifier.pattern_count(),
            ip_ranges = classifier.preview_ranges.len(),
            "Loaded bot signatures"
        );

        Ok(classifier)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn match_preview_ip(&self, signals: &RequestSignals) -> Option<std::net::IpAddr> {
        signals
            .forwarded_ips()
            .find(|ip| self.preview_ranges.iter().any(|range| range.contains(*ip)))
    }

    fn match_user_agent(&self, user_agent: &str) -> Option<&str> {
        // RegexSet reports indices in pattern order, so the lowest index is the
        // first signature that matches.
        self.pattern_set
            .matches(user_agent)
            .iter()
            .next()
            .map(|idx| self.patterns[idx].as_str())
    }
}

impl BotClassifier for SignatureClassifier {
    fn classify(&self, signals: &RequestSignals) -> Result<Verdict, ClassifierError> {
        if let Some(ip) = self.match_preview_ip(signals) {
            debug!(%ip, "Request from preview fetcher IP");
            return Ok(Verdict::Automated(AutomatedReason::PreviewIp(ip)));
        }

        if let Some(user_agent) = signals.user_agent.as_deref()
            && let Some(pattern) = self.match_user_agent(user_agent)
        {
            debug!(user_agent, pattern, "Request from bot User-Agent");
            return Ok(Verdict::Automated(AutomatedReason::UserAgent {
                pattern: pattern.to_string(),
            }));
        }

        Ok(Verdict::Human)
    }
}
