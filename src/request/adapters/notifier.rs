//! Push notification delivery adapters.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::request::ports::{NotifierError, PushNotification, PushNotifier};

/// Writes notifications to the log instead of a device.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl PushNotifier for LoggingNotifier {
    async fn notify(&self, notification: &PushNotification) -> Result<(), NotifierError> {
        info!(
            recipient = %notification.recipient,
            request_id = %notification.request_id,
            title = %notification.title,
            "push notification"
        );
        Ok(())
    }
}

/// Posts notifications as JSON to a push gateway.
///
/// Device registration and fan-out are the gateway's concern; this adapter
/// only hands over recipient, request and copy.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NotifierError(err.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PushNotifier for WebhookNotifier {
    async fn notify(&self, notification: &PushNotification) -> Result<(), NotifierError> {
        self.client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| NotifierError(err.without_url().to_string()))?;
        Ok(())
    }
}
