//! Streams operator positions to the backend while a shift is open.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::backend::{BackendResult, DispatchBackend};
use crate::presence::domain::LocationFix;

/// Forwards every fix from a position source as an online report.
///
/// Failed reports are logged and skipped; the next fix supersedes them.
pub struct LocationTracker {
    backend: Arc<dyn DispatchBackend>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl LocationTracker {
    /// Starts forwarding fixes from `fixes`.
    #[must_use]
    pub fn start(backend: Arc<dyn DispatchBackend>, fixes: mpsc::Receiver<LocationFix>) -> Self {
        let (shutdown, stopping) = oneshot::channel();
        let task = tokio::spawn(forward(Arc::clone(&backend), fixes, stopping));
        Self {
            backend,
            shutdown,
            task,
        }
    }

    /// Stops forwarding, then signs the operator off.
    ///
    /// A report already sent is allowed to finish first; fixes still queued
    /// are dropped. Only then is the sign-off written, so no online report
    /// can land after it.
    ///
    /// # Errors
    ///
    /// Propagates the sign-off failure.
    pub async fn stop(self) -> BackendResult<()> {
        let Self {
            backend,
            shutdown,
            task,
        } = self;
        if shutdown.send(()).is_err() {
            debug!("location task already finished");
        }
        if let Err(err) = task.await {
            warn!(error = %err, "location task ended abnormally");
        }
        backend.go_offline().await
    }
}

async fn forward(
    reporter: Arc<dyn DispatchBackend>,
    mut fixes: mpsc::Receiver<LocationFix>,
    mut stopping: oneshot::Receiver<()>,
) {
    loop {
        let fix = tokio::select! {
            biased;
            _ = &mut stopping => break,
            next = fixes.recv() => match next {
                Some(fix) => fix,
                None => break,
            },
        };
        match reporter.upsert_operator_location(fix, true).await {
            Ok(()) => debug!("location reported"),
            Err(err) => warn!(error = %err, "location report failed"),
        }
    }
}
