//! Broadcast-channel change feed.

use tokio::sync::broadcast;
use tracing::trace;

use crate::request::ports::{ChangePublisher, RequestChange};

/// In-process change feed backed by a `tokio` broadcast channel.
///
/// Slow subscribers lose the oldest cues and observe
/// [`broadcast::error::RecvError::Lagged`]; since cues only trigger a
/// re-read, a lag is handled like any other change.
#[derive(Debug, Clone)]
pub struct BroadcastChangeFeed {
    sender: broadcast::Sender<RequestChange>,
}

impl BroadcastChangeFeed {
    /// Creates a feed buffering up to `capacity` cues per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to cues published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RequestChange> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangePublisher for BroadcastChangeFeed {
    fn publish(&self, change: RequestChange) {
        let receivers = self.sender.send(change).unwrap_or(0);
        trace!(request_id = %change.request_id, receivers, "published request change");
    }
}
