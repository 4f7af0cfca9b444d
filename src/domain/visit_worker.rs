//! Background worker that tracks issued redirects.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

use crate::application::services::TrackingService;
use crate::domain::visit::Visit;

/// Consumes the visit queue and runs the tracking pipeline for each visit.
///
/// At most `concurrency` pipelines run at once. When every sender is dropped
/// the worker finishes the visits already queued and the ones in flight,
/// then returns.
pub async fn run_visit_worker(
    mut rx: mpsc::Receiver<Visit>,
    tracker: Arc<TrackingService>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    tracing::info!(concurrency, "Visit worker started");

    while let Some(visit) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let tracker = tracker.clone();
        tasks.spawn(async move {
            let _permit = permit;
            tracker.track(visit).await
        });

        while let Some(joined) = tasks.try_join_next() {
            log_join_error(joined);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        log_join_error(joined);
    }

    tracing::info!("Visit worker stopped");
}

fn log_join_error<T>(joined: Result<T, tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Visit tracking task panicked");
    }
}
