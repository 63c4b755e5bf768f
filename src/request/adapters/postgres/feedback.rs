//! `PostgreSQL` repository implementation for ratings and messages.

use super::{
    models::{MessageRow, RatingRow},
    schema::{ratings, request_messages},
};
use crate::account::domain::{Role, UserId};
use crate::persistence::{DispatchPgPool, PersistenceFailure, run_blocking};
use crate::request::{
    domain::{MessageBody, MessageId, Rating, RatingId, RequestId, RequestMessage, Stars},
    ports::{FeedbackRepository, FeedbackRepositoryError, FeedbackRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed feedback repository.
#[derive(Debug, Clone)]
pub struct PostgresFeedbackRepository {
    pool: DispatchPgPool,
}

impl PostgresFeedbackRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DispatchPgPool) -> Self {
        Self { pool }
    }
}

impl PersistenceFailure for FeedbackRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn store_rating(&self, rating: &Rating) -> FeedbackRepositoryResult<()> {
        let request_id = rating.request_id;
        let row = RatingRow {
            id: rating.id.into_inner(),
            request_id: request_id.into_inner(),
            rater_id: rating.rater_id.into_inner(),
            rater_role: rating.rater_role.as_str().to_owned(),
            stars: i16::from(rating.stars.value()),
            comment: rating.comment.clone(),
            created_at: rating.created_at,
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(ratings::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        FeedbackRepositoryError::DuplicateRating(request_id)
                    }
                    _ => FeedbackRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn ratings_for(&self, request_id: RequestId) -> FeedbackRepositoryResult<Vec<Rating>> {
        run_blocking(&self.pool, move |connection| {
            let rows = ratings::table
                .filter(ratings::request_id.eq(request_id.into_inner()))
                .order(ratings::created_at.asc())
                .select(RatingRow::as_select())
                .load::<RatingRow>(connection)
                .map_err(FeedbackRepositoryError::persistence)?;
            rows.into_iter().map(row_to_rating).collect()
        })
        .await
    }

    async fn list_ratings(&self) -> FeedbackRepositoryResult<Vec<Rating>> {
        run_blocking(&self.pool, move |connection| {
            let rows = ratings::table
                .order(ratings::created_at.asc())
                .select(RatingRow::as_select())
                .load::<RatingRow>(connection)
                .map_err(FeedbackRepositoryError::persistence)?;
            rows.into_iter().map(row_to_rating).collect()
        })
        .await
    }

    async fn store_message(&self, message: &RequestMessage) -> FeedbackRepositoryResult<()> {
        let row = MessageRow {
            id: message.id.into_inner(),
            request_id: message.request_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            sender_role: message.sender_role.as_str().to_owned(),
            body: message.body.as_str().to_owned(),
            sent_at: message.sent_at,
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(request_messages::table)
                .values(&row)
                .execute(connection)
                .map_err(FeedbackRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn messages_for(
        &self,
        request_id: RequestId,
    ) -> FeedbackRepositoryResult<Vec<RequestMessage>> {
        run_blocking(&self.pool, move |connection| {
            let rows = request_messages::table
                .filter(request_messages::request_id.eq(request_id.into_inner()))
                .order(request_messages::sequence.asc())
                .select(MessageRow::as_select())
                .load::<MessageRow>(connection)
                .map_err(FeedbackRepositoryError::persistence)?;
            rows.into_iter().map(row_to_message).collect()
        })
        .await
    }
}

fn row_to_rating(row: RatingRow) -> FeedbackRepositoryResult<Rating> {
    let stars = u8::try_from(row.stars)
        .map_err(FeedbackRepositoryError::persistence)
        .and_then(|value| Stars::new(value).map_err(FeedbackRepositoryError::persistence))?;
    Ok(Rating {
        id: RatingId::from_uuid(row.id),
        request_id: RequestId::from_uuid(row.request_id),
        rater_id: UserId::from_uuid(row.rater_id),
        rater_role: Role::try_from(row.rater_role.as_str())
            .map_err(FeedbackRepositoryError::persistence)?,
        stars,
        comment: row.comment,
        created_at: row.created_at,
    })
}

fn row_to_message(row: MessageRow) -> FeedbackRepositoryResult<RequestMessage> {
    Ok(RequestMessage {
        id: MessageId::from_uuid(row.id),
        request_id: RequestId::from_uuid(row.request_id),
        sender_id: UserId::from_uuid(row.sender_id),
        sender_role: Role::try_from(row.sender_role.as_str())
            .map_err(FeedbackRepositoryError::persistence)?,
        body: MessageBody::new(&row.body).map_err(FeedbackRepositoryError::persistence)?,
        sent_at: row.sent_at,
    })
}
