//! Repository port for ratings and chat messages.

use crate::request::domain::{Rating, RequestId, RequestMessage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for feedback repository operations.
pub type FeedbackRepositoryResult<T> = Result<T, FeedbackRepositoryError>;

/// Persistence contract for ratings and messages. Both are append-only.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Stores a rating.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackRepositoryError::DuplicateRating`] when the rater
    /// already rated the request.
    async fn store_rating(&self, rating: &Rating) -> FeedbackRepositoryResult<()>;

    /// Returns the ratings left on a request.
    async fn ratings_for(&self, request_id: RequestId) -> FeedbackRepositoryResult<Vec<Rating>>;

    /// Returns every rating.
    async fn list_ratings(&self) -> FeedbackRepositoryResult<Vec<Rating>>;

    /// Appends a message.
    async fn store_message(&self, message: &RequestMessage) -> FeedbackRepositoryResult<()>;

    /// Returns a request's messages in send order.
    async fn messages_for(
        &self,
        request_id: RequestId,
    ) -> FeedbackRepositoryResult<Vec<RequestMessage>>;
}

/// Errors returned by feedback repository implementations.
#[derive(Debug, Clone, Error)]
pub enum FeedbackRepositoryError {
    /// The rater already rated this request.
    #[error("request {0} was already rated by this user")]
    DuplicateRating(RequestId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl FeedbackRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
