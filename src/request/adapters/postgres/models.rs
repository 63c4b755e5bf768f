//! Diesel row models for request persistence.

use super::schema::{request_events, request_messages, request_pins, ratings, service_requests};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row model for service requests.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = service_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServiceRequestRow {
    /// Request identifier.
    pub id: uuid::Uuid,
    /// Requester.
    pub user_id: uuid::Uuid,
    /// Assigned operator.
    pub operator_id: Option<uuid::Uuid>,
    /// Provider of the assigned operator.
    pub provider_id: Option<uuid::Uuid>,
    /// Service type.
    pub service_type: String,
    /// Tow truck class.
    pub tow_type: Option<String>,
    /// Service-specific details.
    pub service_details: Value,
    /// Pickup latitude.
    pub pickup_lat: f64,
    /// Pickup longitude.
    pub pickup_lng: f64,
    /// Pickup address.
    pub pickup_address: Option<String>,
    /// Dropoff latitude.
    pub dropoff_lat: f64,
    /// Dropoff longitude.
    pub dropoff_lng: f64,
    /// Dropoff address.
    pub dropoff_address: Option<String>,
    /// Incident description.
    pub incident_type: Option<String>,
    /// Operator notes.
    pub notes: Option<String>,
    /// Photo reference.
    pub photo_url: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Total price in cents.
    pub total_price_cents: Option<i64>,
    /// Full quote.
    pub price_quote: Option<Value>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// Role of the cancelling party.
    pub cancelled_by: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Departure timestamp.
    pub en_route_at: Option<DateTime<Utc>>,
    /// Arrival timestamp.
    pub arrived_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp.
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Columns a transition may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = service_requests)]
#[diesel(treat_none_as_null = true)]
pub struct TransitionChangeset {
    /// Assigned operator.
    pub operator_id: Option<uuid::Uuid>,
    /// Provider of the assigned operator.
    pub provider_id: Option<uuid::Uuid>,
    /// Lifecycle status.
    pub status: String,
    /// Total price in cents.
    pub total_price_cents: Option<i64>,
    /// Full quote.
    pub price_quote: Option<Value>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// Role of the cancelling party.
    pub cancelled_by: Option<String>,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Departure timestamp.
    pub en_route_at: Option<DateTime<Utc>>,
    /// Arrival timestamp.
    pub arrived_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp.
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Row model for audit events. `sequence` is assigned by the database.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = request_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RequestEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Request identifier.
    pub request_id: uuid::Uuid,
    /// Acting user.
    pub actor_id: uuid::Uuid,
    /// Acting role.
    pub actor_role: String,
    /// Status before the transition.
    pub from_status: Option<String>,
    /// Status after the transition.
    pub to_status: String,
    /// Free-text context.
    pub note: Option<String>,
    /// Transition timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Row model for PIN records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = request_pins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PinRow {
    /// Request identifier.
    pub request_id: uuid::Uuid,
    /// bcrypt hash.
    pub pin_hash: String,
    /// Consecutive wrong guesses.
    pub failed_attempts: i32,
    /// Lock deadline.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Row model for ratings.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RatingRow {
    /// Rating identifier.
    pub id: uuid::Uuid,
    /// Rated request.
    pub request_id: uuid::Uuid,
    /// Rater.
    pub rater_id: uuid::Uuid,
    /// Rater role.
    pub rater_role: String,
    /// Stars.
    pub stars: i16,
    /// Optional comment.
    pub comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for chat messages. `sequence` is assigned by the database.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = request_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Request identifier.
    pub request_id: uuid::Uuid,
    /// Author.
    pub sender_id: uuid::Uuid,
    /// Author role.
    pub sender_role: String,
    /// Text.
    pub body: String,
    /// Send timestamp.
    pub sent_at: DateTime<Utc>,
}
