//! Diesel row models for presence persistence.

use super::schema::operator_locations;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model for operator locations, used for both reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = operator_locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LocationRow {
    /// Reporting operator.
    pub operator_id: uuid::Uuid,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Compass heading in degrees.
    pub heading: Option<f64>,
    /// Online flag.
    pub is_online: bool,
    /// Last write.
    pub updated_at: DateTime<Utc>,
}
