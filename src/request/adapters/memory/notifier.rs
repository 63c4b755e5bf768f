//! Notifier that keeps every notification in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::request::ports::{NotifierError, PushNotification, PushNotifier};

/// Records notifications instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<PushNotification>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn sent(&self) -> Vec<PushNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushNotifier for RecordingNotifier {
    async fn notify(&self, notification: &PushNotification) -> Result<(), NotifierError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|err| NotifierError(err.to_string()))?;
        sent.push(notification.clone());
        Ok(())
    }
}
