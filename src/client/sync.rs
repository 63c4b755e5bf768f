//! Keeps a local copy of the caller's active request current.
//!
//! Change cues carry no payload; on each one the active request is fetched
//! again. A receiver that lagged behind the feed missed cues, so lag is
//! treated as a change too. Backends without a feed are polled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::backend::DispatchBackend;
use crate::request::{domain::ServiceRequest, ports::RequestChange};

/// Background task mirroring the active request into a watch channel.
#[derive(Debug)]
pub struct RequestSync {
    current: watch::Receiver<Option<ServiceRequest>>,
    task: JoinHandle<()>,
}

impl RequestSync {
    /// Starts mirroring. The first fetch happens immediately.
    ///
    /// `poll_every` is only used when the backend offers no feed.
    #[must_use]
    pub fn start(backend: Arc<dyn DispatchBackend>, poll_every: Duration) -> Self {
        let (sender, current) = watch::channel(None);
        let task = match backend.changes() {
            Some(changes) => tokio::spawn(follow_feed(backend, changes, sender)),
            None => tokio::spawn(poll(backend, poll_every, sender)),
        };
        Self { current, task }
    }

    /// A receiver that observes every refresh.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<ServiceRequest>> {
        self.current.clone()
    }

    /// The last fetched value.
    #[must_use]
    pub fn current(&self) -> Option<ServiceRequest> {
        self.current.borrow().clone()
    }

    /// Stops the background task and waits until it has wound down.
    ///
    /// Once this returns no further refresh touches the mirror. Dropping the
    /// handle also stops the task, without waiting.
    pub async fn stop(mut self) {
        self.task.abort();
        if let Err(err) = (&mut self.task).await
            && !err.is_cancelled()
        {
            warn!(error = %err, "active request sync ended abnormally");
        }
    }
}

impl Drop for RequestSync {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn refresh(
    backend: &dyn DispatchBackend,
    sender: &watch::Sender<Option<ServiceRequest>>,
) {
    match backend.get_active_request().await {
        Ok(active) => {
            let changed = sender.send_if_modified(|held| {
                if *held == active {
                    false
                } else {
                    *held = active;
                    true
                }
            });
            if changed {
                debug!("active request changed");
            }
        }
        Err(err) => warn!(error = %err, "active request refresh failed"),
    }
}

async fn follow_feed(
    backend: Arc<dyn DispatchBackend>,
    mut changes: broadcast::Receiver<RequestChange>,
    sender: watch::Sender<Option<ServiceRequest>>,
) {
    refresh(backend.as_ref(), &sender).await;
    loop {
        match changes.recv().await {
            Ok(change) => {
                debug!(request_id = %change.request_id, "change cue received");
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                debug!(missed, "change feed lagged; refetching");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
        refresh(backend.as_ref(), &sender).await;
        if sender.is_closed() {
            break;
        }
    }
}

async fn poll(
    backend: Arc<dyn DispatchBackend>,
    every: Duration,
    sender: watch::Sender<Option<ServiceRequest>>,
) {
    let mut ticks = tokio::time::interval(every);
    ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticks.tick().await;
        refresh(backend.as_ref(), &sender).await;
        if sender.is_closed() {
            break;
        }
    }
}
