//! Ratings and in-request chat.

use super::{MessageId, RatingId, RequestDomainError, RequestId, RequestStatus, ServiceRequest};
use crate::account::domain::{Actor, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Longest accepted rating comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 500;
/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    /// Validates a star count.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::InvalidStars`] outside 1..=5.
    pub const fn new(value: u8) -> Result<Self, RequestDomainError> {
        if value >= 1 && value <= 5 {
            Ok(Self(value))
        } else {
            Err(RequestDomainError::InvalidStars(value))
        }
    }

    /// Returns the star count.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = RequestDomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

/// Immutable rating left by one party of a completed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Rating identifier.
    pub id: RatingId,
    /// Rated request.
    pub request_id: RequestId,
    /// Who rated.
    pub rater_id: UserId,
    /// Role of the rater.
    pub rater_role: Role,
    /// Stars given.
    pub stars: Stars,
    /// Optional comment, trimmed.
    pub comment: Option<String>,
    /// When the rating was left.
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Creates a rating for a completed request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::NotAParty`] for outsiders,
    /// [`RequestDomainError::NotRateable`] before completion, and
    /// [`RequestDomainError::FieldTooLong`] for long comments.
    pub fn new(
        request: &ServiceRequest,
        actor: &Actor,
        stars: Stars,
        comment: Option<&str>,
        clock: &impl Clock,
    ) -> Result<Self, RequestDomainError> {
        if !request.is_party(actor) {
            return Err(RequestDomainError::NotAParty(request.id()));
        }
        if request.status() != RequestStatus::Completed {
            return Err(RequestDomainError::NotRateable {
                id: request.id(),
                status: request.status(),
            });
        }
        let comment = comment.map(str::trim).filter(|text| !text.is_empty());
        if comment.is_some_and(|text| text.chars().count() > MAX_COMMENT_CHARS) {
            return Err(RequestDomainError::FieldTooLong {
                field: "comment",
                max: MAX_COMMENT_CHARS,
            });
        }
        Ok(Self {
            id: RatingId::new(),
            request_id: request.id(),
            rater_id: actor.user_id(),
            rater_role: actor.role(),
            stars,
            comment: comment.map(str::to_owned),
            created_at: clock.utc(),
        })
    }
}

/// Validated chat message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageBody(String);

impl MessageBody {
    /// Validates a message body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::EmptyMessage`] for blank input and
    /// [`RequestDomainError::FieldTooLong`] past [`MAX_MESSAGE_CHARS`].
    pub fn new(raw: &str) -> Result<Self, RequestDomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RequestDomainError::EmptyMessage);
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(RequestDomainError::FieldTooLong {
                field: "message",
                max: MAX_MESSAGE_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = RequestDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<MessageBody> for String {
    fn from(body: MessageBody) -> Self {
        body.0
    }
}

/// Immutable chat message between the requester and the assigned operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Request the conversation belongs to.
    pub request_id: RequestId,
    /// Author.
    pub sender_id: UserId,
    /// Role of the author.
    pub sender_role: Role,
    /// Text.
    pub body: MessageBody,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}

impl RequestMessage {
    /// Creates a message while an operator is working the request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::NotAParty`] for outsiders and
    /// [`RequestDomainError::MessagingClosed`] outside assigned, en-route
    /// and active requests.
    pub fn new(
        request: &ServiceRequest,
        actor: &Actor,
        body: MessageBody,
        clock: &impl Clock,
    ) -> Result<Self, RequestDomainError> {
        if !request.is_party(actor) {
            return Err(RequestDomainError::NotAParty(request.id()));
        }
        if !request.status().holds_operator() {
            return Err(RequestDomainError::MessagingClosed {
                id: request.id(),
                status: request.status(),
            });
        }
        Ok(Self {
            id: MessageId::new(),
            request_id: request.id(),
            sender_id: actor.user_id(),
            sender_role: actor.role(),
            body,
            sent_at: clock.utc(),
        })
    }
}
