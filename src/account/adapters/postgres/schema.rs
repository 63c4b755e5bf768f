//! Diesel schema for account persistence.

diesel::table! {
    /// Fleets that employ operators.
    providers (id) {
        /// Provider identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Account profiles keyed by user identifier.
    profiles (user_id) {
        /// User identifier.
        user_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        full_name -> Varchar,
        /// Optional contact phone number.
        #[max_length = 50]
        phone -> Nullable<Varchar>,
        /// Account role.
        #[max_length = 20]
        role -> Varchar,
        /// Provider association, present only for operators.
        provider_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
