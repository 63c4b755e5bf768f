//! Diesel row models for pricing persistence.

use super::schema::{pricing_rules, service_rates};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model for pricing rules.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pricing_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PricingRuleRow {
    /// Rule identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Exit fee in cents.
    pub base_exit_fee_cents: i64,
    /// Included distance in meters.
    pub included_meters: i64,
    /// Light tow rate in cents per kilometer.
    pub price_per_km_light_cents: i64,
    /// Heavy tow rate in cents per kilometer.
    pub price_per_km_heavy_cents: i64,
    /// Activation flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for flat service rates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = service_rates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServiceRateRow {
    /// Service type.
    pub service_type: String,
    /// Base price in cents.
    pub base_price_cents: i64,
    /// Fee per surcharge unit, in cents.
    pub extra_fee_cents: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
