//! Ratings and in-request chat.

use crate::account::domain::Actor;
use crate::request::{
    domain::{
        MessageBody, Rating, RequestDomainError, RequestId, RequestMessage, ServiceRequest, Stars,
    },
    ports::{
        ChangeKind, ChangePublisher, FeedbackRepository, FeedbackRepositoryError, RequestChange,
        RequestRepositoryError, ServiceRequestRepository,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for feedback operations.
#[derive(Debug, Error)]
pub enum FeedbackServiceError {
    /// Validation or lifecycle rule violated.
    #[error(transparent)]
    Domain(#[from] RequestDomainError),
    /// Request lookup failed.
    #[error(transparent)]
    Requests(#[from] RequestRepositoryError),
    /// Rating or message persistence failed.
    #[error(transparent)]
    Repository(#[from] FeedbackRepositoryError),
    /// No request with this identifier exists.
    #[error("service request {0} not found")]
    NotFound(RequestId),
}

/// Result type for feedback operations.
pub type FeedbackServiceResult<T> = Result<T, FeedbackServiceError>;

/// Ratings and messages scoped to a single request.
#[derive(Clone)]
pub struct FeedbackService<R, F, C>
where
    R: ServiceRequestRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
    C: Clock + Send + Sync,
{
    requests: Arc<R>,
    feedback: Arc<F>,
    publisher: Arc<dyn ChangePublisher>,
    clock: Arc<C>,
}

impl<R, F, C> FeedbackService<R, F, C>
where
    R: ServiceRequestRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a feedback service.
    #[must_use]
    pub fn new(
        requests: Arc<R>,
        feedback: Arc<F>,
        publisher: Arc<dyn ChangePublisher>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            requests,
            feedback,
            publisher,
            clock,
        }
    }

    /// Rates a completed request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::InvalidStars`] outside 1..=5,
    /// [`RequestDomainError::NotRateable`] before completion, and
    /// [`FeedbackRepositoryError::DuplicateRating`] for a second rating by
    /// the same party.
    pub async fn rate(
        &self,
        actor: &Actor,
        id: RequestId,
        stars: u8,
        comment: Option<&str>,
    ) -> FeedbackServiceResult<Rating> {
        let stars = Stars::new(stars)?;
        let request = self.load(id).await?;
        let rating = Rating::new(&request, actor, stars, comment, &*self.clock)?;
        self.feedback.store_rating(&rating).await?;
        info!(request_id = %id, rater_role = %rating.rater_role, stars = stars.value(), "request rated");
        self.publisher.publish(RequestChange {
            request_id: id,
            kind: ChangeKind::Rating,
        });
        Ok(rating)
    }

    /// Appends a chat message.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::EmptyMessage`] for blank text and
    /// [`RequestDomainError::MessagingClosed`] when no operator is working
    /// the request.
    pub async fn send_message(
        &self,
        actor: &Actor,
        id: RequestId,
        body: &str,
    ) -> FeedbackServiceResult<RequestMessage> {
        let body = MessageBody::new(body)?;
        let request = self.load(id).await?;
        let message = RequestMessage::new(&request, actor, body, &*self.clock)?;
        self.feedback.store_message(&message).await?;
        self.publisher.publish(RequestChange {
            request_id: id,
            kind: ChangeKind::Message,
        });
        Ok(message)
    }

    /// Returns a request's conversation in send order.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::NotAParty`] for outsiders.
    pub async fn messages_for(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> FeedbackServiceResult<Vec<RequestMessage>> {
        let request = self.load(id).await?;
        if !request.is_party(actor) {
            return Err(RequestDomainError::NotAParty(id).into());
        }
        Ok(self.feedback.messages_for(id).await?)
    }

    async fn load(&self, id: RequestId) -> FeedbackServiceResult<ServiceRequest> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or(FeedbackServiceError::NotFound(id))
    }
}
