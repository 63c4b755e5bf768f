//! Diesel row models for account persistence.

use super::schema::{profiles, providers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model for providers, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = providers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProviderRow {
    /// Provider identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for profiles, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    /// User identifier.
    pub user_id: uuid::Uuid,
    /// Display name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Account role.
    pub role: String,
    /// Provider association.
    pub provider_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
