//! Post-redirect click tracking pipeline.
//!
//! For each visit: fetch the tracking record, classify the requester, append
//! a click for human visits, then let the alert policy decide whether the link
//! owner gets an email. Every step can fail on its own; failures are logged and
//! counted, never retried, and never reach the visitor, whose redirect does
//! not wait on this pipeline.
//!
//! Counters go through the `metrics` facade only. The server installs no
//! recorder, so they are no-ops unless an embedding binary installs one.

use std::sync::Arc;

use metrics::counter;

use crate::domain::alert_policy::AlertPolicy;
use crate::domain::classifier::{BotClassifier, Verdict};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::domain::visit::Visit;
use crate::infrastructure::notifier::Notifier;

/// How far a visit got through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingOutcome {
    /// The path no longer resolves to a link.
    RecordMissing,
    /// The store failed while loading the tracking record.
    RecordUnavailable,
    /// Bot or link preview; nothing recorded.
    SkippedAutomated,
    /// The click could not be appended; no alert was evaluated.
    ClickFailed,
    /// Click recorded, no alert due.
    Counted { clicks: i64 },
    /// Click recorded and the owner alert was accepted by the notifier.
    Alerted { clicks: i64, last: bool },
    /// Click recorded but the owner alert was not accepted.
    AlertFailed { clicks: i64 },
}

impl TrackingOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RecordMissing => "record_missing",
            Self::RecordUnavailable => "record_unavailable",
            Self::SkippedAutomated => "skipped_automated",
            Self::ClickFailed => "click_failed",
            Self::Counted { .. } => "counted",
            Self::Alerted { .. } => "alerted",
            Self::AlertFailed { .. } => "alert_failed",
        }
    }
}

pub struct TrackingService {
    link_repository: Arc<dyn LinkRepository>,
    click_repository: Arc<dyn ClickRepository>,
    classifier: Arc<dyn BotClassifier>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
}

impl TrackingService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
        classifier: Arc<dyn BotClassifier>,
        notifier: Arc<dyn Notifier>,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            link_repository,
            click_repository,
            classifier,
            notifier,
            policy,
        }
    }

    /// Runs the tracking pipeline for one visit.
    pub async fn track(&self, visit: Visit) -> TrackingOutcome {
        let outcome = self.run(&visit).await;
        counter!("linkup_visits_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn run(&self, visit: &Visit) -> TrackingOutcome {
        let path = visit.path.as_str();

        let record = match self.link_repository.fetch_tracking_record(path).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(path, "Tracking record vanished after redirect");
                return TrackingOutcome::RecordMissing;
            }
            Err(e) => {
                tracing::error!(path, error = %e, "Failed to load tracking record");
                return TrackingOutcome::RecordUnavailable;
            }
        };

        match self.classifier.classify(&visit.signals) {
            Ok(Verdict::Automated(reason)) => {
                tracing::debug!(path, ?reason, "Automated visit, not counted");
                return TrackingOutcome::SkippedAutomated;
            }
            Ok(Verdict::Human) => {}
            Err(e) => {
                counter!("linkup_classifier_failures_total").increment(1);
                tracing::warn!(path, error = %e, "Classifier failed, counting visit as human");
            }
        }

        let clicks = match self.click_repository.append_click(record.link_id).await {
            Ok(clicks) => clicks,
            Err(e) => {
                tracing::error!(link_id = record.link_id, error = %e, "Failed to record click");
                return TrackingOutcome::ClickFailed;
            }
        };

        tracing::debug!(link_id = record.link_id, clicks, "Click recorded");

        let Some(alert) = self.policy.evaluate(&record, clicks) else {
            return TrackingOutcome::Counted { clicks };
        };

        match self
            .notifier
            .send(&alert.recipient, &alert.subject, &alert.body)
            .await
        {
            Ok(()) => {
                counter!("linkup_alerts_total", "result" => "sent").increment(1);
                tracing::info!(
                    link_id = record.link_id,
                    clicks,
                    last = alert.is_last,
                    "Click alert sent"
                );
                TrackingOutcome::Alerted {
                    clicks,
                    last: alert.is_last,
                }
            }
            Err(e) => {
                counter!("linkup_alerts_total", "result" => "failed").increment(1);
                tracing::error!(link_id = record.link_id, clicks, error = %e, "Click alert not sent");
                TrackingOutcome::AlertFailed { clicks }
            }
        }
    }
}
