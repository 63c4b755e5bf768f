//! Diesel schema for presence persistence.

diesel::table! {
    /// Last known location per operator.
    operator_locations (operator_id) {
        /// Reporting operator.
        operator_id -> Uuid,
        /// Latitude in degrees.
        lat -> Float8,
        /// Longitude in degrees.
        lng -> Float8,
        /// Compass heading in degrees.
        heading -> Nullable<Float8>,
        /// Online flag.
        is_online -> Bool,
        /// Last write.
        updated_at -> Timestamptz,
    }
}
