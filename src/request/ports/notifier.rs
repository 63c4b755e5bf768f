//! Push notification port.

use crate::account::domain::UserId;
use crate::request::domain::RequestId;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Notification addressed to one party of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    /// Recipient.
    pub recipient: UserId,
    /// Request the notification is about.
    pub request_id: RequestId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Delivery failure. Callers log it and carry on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("push notification delivery failed: {0}")]
pub struct NotifierError(pub String);

/// Best-effort push delivery.
#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// Sends a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when delivery fails.
    async fn notify(&self, notification: &PushNotification) -> Result<(), NotifierError>;
}
