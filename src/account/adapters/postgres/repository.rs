//! `PostgreSQL` repository implementation for profiles and providers.

use super::{
    models::{ProfileRow, ProviderRow},
    schema::{profiles, providers},
};
use crate::account::{
    domain::{PersistedProfileData, Profile, Provider, ProviderId, Role, UserId},
    ports::{AccountRepository, AccountRepositoryError, AccountRepositoryResult},
};
use crate::persistence::{DispatchPgPool, PersistenceFailure, run_blocking};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed account repository.
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: DispatchPgPool,
}

impl PostgresAccountRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DispatchPgPool) -> Self {
        Self { pool }
    }
}

impl PersistenceFailure for AccountRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn store_provider(&self, provider: &Provider) -> AccountRepositoryResult<()> {
        let provider_id = provider.id();
        let row = ProviderRow {
            id: provider_id.into_inner(),
            name: provider.name().to_owned(),
            created_at: provider.created_at(),
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(providers::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AccountRepositoryError::DuplicateProvider(provider_id)
                    }
                    _ => AccountRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_provider(&self, id: ProviderId) -> AccountRepositoryResult<Option<Provider>> {
        run_blocking(&self.pool, move |connection| {
            let row = providers::table
                .filter(providers::id.eq(id.into_inner()))
                .select(ProviderRow::as_select())
                .first::<ProviderRow>(connection)
                .optional()
                .map_err(AccountRepositoryError::persistence)?;
            Ok(row.map(|found| {
                Provider::from_persisted(
                    ProviderId::from_uuid(found.id),
                    found.name,
                    found.created_at,
                )
            }))
        })
        .await
    }

    async fn store_profile(&self, profile: &Profile) -> AccountRepositoryResult<()> {
        let user_id = profile.user_id();
        let row = to_row(profile);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(profiles::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AccountRepositoryError::DuplicateProfile(user_id)
                    }
                    _ => AccountRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_profile(&self, profile: &Profile) -> AccountRepositoryResult<()> {
        let user_id = profile.user_id();
        let row = to_row(profile);
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(profiles::table.filter(profiles::user_id.eq(row.user_id)))
                .set((
                    profiles::full_name.eq(&row.full_name),
                    profiles::phone.eq(&row.phone),
                    profiles::role.eq(&row.role),
                    profiles::provider_id.eq(row.provider_id),
                    profiles::updated_at.eq(row.updated_at),
                ))
                .execute(connection)
                .map_err(AccountRepositoryError::persistence)?;
            if updated == 0 {
                return Err(AccountRepositoryError::ProfileNotFound(user_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_profile(&self, user_id: UserId) -> AccountRepositoryResult<Option<Profile>> {
        run_blocking(&self.pool, move |connection| {
            let row = profiles::table
                .filter(profiles::user_id.eq(user_id.into_inner()))
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(connection)
                .optional()
                .map_err(AccountRepositoryError::persistence)?;
            row.map(row_to_profile).transpose()
        })
        .await
    }
}

fn to_row(profile: &Profile) -> ProfileRow {
    ProfileRow {
        user_id: profile.user_id().into_inner(),
        full_name: profile.full_name().to_owned(),
        phone: profile.phone().map(ToOwned::to_owned),
        role: profile.role().as_str().to_owned(),
        provider_id: profile.provider_id().map(ProviderId::into_inner),
        created_at: profile.created_at(),
        updated_at: profile.updated_at(),
    }
}

fn row_to_profile(row: ProfileRow) -> AccountRepositoryResult<Profile> {
    let role = Role::try_from(row.role.as_str()).map_err(AccountRepositoryError::persistence)?;
    Ok(Profile::from_persisted(PersistedProfileData {
        user_id: UserId::from_uuid(row.user_id),
        full_name: row.full_name,
        phone: row.phone,
        role,
        provider_id: row.provider_id.map(ProviderId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
