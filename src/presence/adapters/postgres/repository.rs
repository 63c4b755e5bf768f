//! `PostgreSQL` repository implementation for operator locations.

use super::{models::LocationRow, schema::operator_locations};
use crate::account::domain::UserId;
use crate::distance::domain::GeoPoint;
use crate::persistence::{DispatchPgPool, PersistenceFailure, run_blocking};
use crate::presence::{
    domain::OperatorLocation,
    ports::{PresenceRepository, PresenceRepositoryError, PresenceRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;

/// `PostgreSQL`-backed presence repository.
#[derive(Debug, Clone)]
pub struct PostgresPresenceRepository {
    pool: DispatchPgPool,
}

impl PostgresPresenceRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DispatchPgPool) -> Self {
        Self { pool }
    }
}

impl PersistenceFailure for PresenceRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl PresenceRepository for PostgresPresenceRepository {
    async fn upsert(&self, location: &OperatorLocation) -> PresenceRepositoryResult<()> {
        let row = LocationRow {
            operator_id: location.operator_id.into_inner(),
            lat: location.point.lat(),
            lng: location.point.lng(),
            heading: location.heading,
            is_online: location.is_online,
            updated_at: location.updated_at,
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(operator_locations::table)
                .values(&row)
                .on_conflict(operator_locations::operator_id)
                .do_update()
                .set((
                    operator_locations::lat.eq(excluded(operator_locations::lat)),
                    operator_locations::lng.eq(excluded(operator_locations::lng)),
                    operator_locations::heading.eq(excluded(operator_locations::heading)),
                    operator_locations::is_online.eq(excluded(operator_locations::is_online)),
                    operator_locations::updated_at.eq(excluded(operator_locations::updated_at)),
                ))
                .execute(connection)
                .map_err(PresenceRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find(&self, operator_id: UserId) -> PresenceRepositoryResult<Option<OperatorLocation>> {
        run_blocking(&self.pool, move |connection| {
            let row = operator_locations::table
                .filter(operator_locations::operator_id.eq(operator_id.into_inner()))
                .select(LocationRow::as_select())
                .first::<LocationRow>(connection)
                .optional()
                .map_err(PresenceRepositoryError::persistence)?;
            row.map(row_to_location).transpose()
        })
        .await
    }

    async fn mark_offline(
        &self,
        operator_id: UserId,
        at: DateTime<Utc>,
    ) -> PresenceRepositoryResult<bool> {
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(
                operator_locations::table
                    .filter(operator_locations::operator_id.eq(operator_id.into_inner())),
            )
            .set((
                operator_locations::is_online.eq(false),
                operator_locations::updated_at.eq(at),
            ))
            .execute(connection)
            .map_err(PresenceRepositoryError::persistence)?;
            Ok(updated > 0)
        })
        .await
    }
}

fn row_to_location(row: LocationRow) -> PresenceRepositoryResult<OperatorLocation> {
    let point = GeoPoint::new(row.lat, row.lng).map_err(PresenceRepositoryError::persistence)?;
    Ok(OperatorLocation {
        operator_id: UserId::from_uuid(row.operator_id),
        point,
        heading: row.heading,
        is_online: row.is_online,
        updated_at: row.updated_at,
    })
}
