//! Diesel schema for pricing persistence.

diesel::table! {
    /// Tow pricing rules; a partial unique index allows one active row.
    pricing_rules (id) {
        /// Rule identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Exit fee in cents.
        base_exit_fee_cents -> Int8,
        /// Included distance in meters.
        included_meters -> Int8,
        /// Light tow rate per kilometer, in cents.
        price_per_km_light_cents -> Int8,
        /// Heavy tow rate per kilometer, in cents.
        price_per_km_heavy_cents -> Int8,
        /// Activation flag.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Flat rates for on-site services.
    service_rates (service_type) {
        /// Service type.
        #[max_length = 20]
        service_type -> Varchar,
        /// Base price in cents.
        base_price_cents -> Int8,
        /// Fee per surcharge unit, in cents.
        extra_fee_cents -> Int8,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
