//! Identifier types for the request domain.

use crate::ids::uuid_identifier;

uuid_identifier! {
    /// Identifier of a service request.
    RequestId
}

uuid_identifier! {
    /// Identifier of an audit event.
    EventId
}

uuid_identifier! {
    /// Identifier of a chat message.
    MessageId
}

uuid_identifier! {
    /// Identifier of a rating.
    RatingId
}
