//! Visit model handed from the redirect handler to the tracking worker.

use crate::domain::classifier::RequestSignals;

/// One redirect that was issued and still needs to be tracked.
///
/// Created in the redirect handler after the destination is resolved, sent to
/// the bounded visit queue and consumed by
/// [`crate::domain::visit_worker::run_visit_worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub path: String,
    pub signals: RequestSignals,
}

impl Visit {
    pub fn new(path: impl Into<String>, signals: RequestSignals) -> Self {
        Self {
            path: path.into(),
            signals,
        }
    }
}
