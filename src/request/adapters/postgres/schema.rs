//! Diesel schema for request persistence.

diesel::table! {
    /// Service requests.
    ///
    /// Partial unique indexes keep one non-terminal request per user and one
    /// assigned, en-route or active request per operator.
    service_requests (id) {
        /// Request identifier.
        id -> Uuid,
        /// Requester.
        user_id -> Uuid,
        /// Assigned operator.
        operator_id -> Nullable<Uuid>,
        /// Provider of the assigned operator.
        provider_id -> Nullable<Uuid>,
        /// Service type.
        #[max_length = 20]
        service_type -> Varchar,
        /// Tow truck class.
        #[max_length = 20]
        tow_type -> Nullable<Varchar>,
        /// Service-specific details.
        service_details -> Jsonb,
        /// Pickup latitude.
        pickup_lat -> Float8,
        /// Pickup longitude.
        pickup_lng -> Float8,
        /// Pickup address.
        pickup_address -> Nullable<Text>,
        /// Dropoff latitude.
        dropoff_lat -> Float8,
        /// Dropoff longitude.
        dropoff_lng -> Float8,
        /// Dropoff address.
        dropoff_address -> Nullable<Text>,
        /// Incident description.
        incident_type -> Nullable<Text>,
        /// Operator notes.
        notes -> Nullable<Text>,
        /// Photo reference.
        photo_url -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Total price in cents.
        total_price_cents -> Nullable<Int8>,
        /// Full quote with breakdown.
        price_quote -> Nullable<Jsonb>,
        /// Cancellation reason.
        cancellation_reason -> Nullable<Text>,
        /// Role of the cancelling party.
        #[max_length = 20]
        cancelled_by -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest change timestamp.
        updated_at -> Timestamptz,
        /// Assignment timestamp.
        assigned_at -> Nullable<Timestamptz>,
        /// Departure timestamp.
        en_route_at -> Nullable<Timestamptz>,
        /// Arrival timestamp.
        arrived_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Cancellation timestamp.
        cancelled_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit trail.
    request_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Insertion order.
        sequence -> Int8,
        /// Request identifier.
        request_id -> Uuid,
        /// Acting user.
        actor_id -> Uuid,
        /// Acting role.
        #[max_length = 20]
        actor_role -> Varchar,
        /// Status before the transition.
        #[max_length = 20]
        from_status -> Nullable<Varchar>,
        /// Status after the transition.
        #[max_length = 20]
        to_status -> Varchar,
        /// Free-text context.
        note -> Nullable<Text>,
        /// Transition timestamp.
        occurred_at -> Timestamptz,
    }
}

diesel::table! {
    /// Hashed PINs with their attempt counters.
    request_pins (request_id) {
        /// Request identifier.
        request_id -> Uuid,
        /// bcrypt hash.
        #[max_length = 72]
        pin_hash -> Varchar,
        /// Consecutive wrong guesses.
        failed_attempts -> Int4,
        /// Lock deadline.
        locked_until -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Ratings, unique per request and rater.
    ratings (id) {
        /// Rating identifier.
        id -> Uuid,
        /// Rated request.
        request_id -> Uuid,
        /// Rater.
        rater_id -> Uuid,
        /// Rater role.
        #[max_length = 20]
        rater_role -> Varchar,
        /// Stars, 1 to 5.
        stars -> Int2,
        /// Optional comment.
        comment -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only chat messages.
    request_messages (id) {
        /// Message identifier.
        id -> Uuid,
        /// Insertion order.
        sequence -> Int8,
        /// Request identifier.
        request_id -> Uuid,
        /// Author.
        sender_id -> Uuid,
        /// Author role.
        #[max_length = 20]
        sender_role -> Varchar,
        /// Text.
        body -> Text,
        /// Send timestamp.
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(request_events -> service_requests (request_id));
diesel::joinable!(request_pins -> service_requests (request_id));
diesel::joinable!(ratings -> service_requests (request_id));
diesel::joinable!(request_messages -> service_requests (request_id));

diesel::allow_tables_to_appear_in_same_query!(
    service_requests,
    request_events,
    request_pins,
    ratings,
    request_messages,
);
