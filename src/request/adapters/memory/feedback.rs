//! In-memory repository for ratings and messages.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::request::{
    domain::{Rating, RequestId, RequestMessage},
    ports::{FeedbackRepository, FeedbackRepositoryError, FeedbackRepositoryResult},
};

/// Thread-safe in-memory feedback repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedbackRepository {
    state: Arc<RwLock<InMemoryFeedbackState>>,
}

#[derive(Debug, Default)]
struct InMemoryFeedbackState {
    ratings: Vec<Rating>,
    messages: Vec<RequestMessage>,
}

impl InMemoryFeedbackRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(message: String) -> FeedbackRepositoryError {
    FeedbackRepositoryError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn store_rating(&self, rating: &Rating) -> FeedbackRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        let duplicate = state.ratings.iter().any(|existing| {
            existing.request_id == rating.request_id && existing.rater_id == rating.rater_id
        });
        if duplicate {
            return Err(FeedbackRepositoryError::DuplicateRating(rating.request_id));
        }
        state.ratings.push(rating.clone());
        Ok(())
    }

    async fn ratings_for(&self, request_id: RequestId) -> FeedbackRepositoryResult<Vec<Rating>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state
            .ratings
            .iter()
            .filter(|rating| rating.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn list_ratings(&self) -> FeedbackRepositoryResult<Vec<Rating>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.ratings.clone())
    }

    async fn store_message(&self, message: &RequestMessage) -> FeedbackRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        state.messages.push(message.clone());
        Ok(())
    }

    async fn messages_for(
        &self,
        request_id: RequestId,
    ) -> FeedbackRepositoryResult<Vec<RequestMessage>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state
            .messages
            .iter()
            .filter(|message| message.request_id == request_id)
            .cloned()
            .collect())
    }
}
