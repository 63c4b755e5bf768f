//! `PostgreSQL` repository implementation for pricing rules and rates.

use super::{
    models::{PricingRuleRow, ServiceRateRow},
    schema::{pricing_rules, service_rates},
};
use crate::persistence::{
    CENTS, DispatchPgPool, METERS, PersistenceFailure, from_minor_units, run_blocking,
    to_minor_units,
};
use crate::pricing::{
    domain::{NewPricingRule, PersistedPricingRuleData, PricingRule, PricingRuleId, ServiceRate},
    ports::{PricingRepository, PricingRepositoryError, PricingRepositoryResult},
};
use crate::request::domain::{ServiceType, TowType};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;

/// `PostgreSQL`-backed pricing repository.
#[derive(Debug, Clone)]
pub struct PostgresPricingRepository {
    pool: DispatchPgPool,
}

impl PostgresPricingRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DispatchPgPool) -> Self {
        Self { pool }
    }
}

impl PersistenceFailure for PricingRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl PricingRepository for PostgresPricingRepository {
    async fn store_rule(&self, rule: &PricingRule) -> PricingRepositoryResult<()> {
        let rule_id = rule.id();
        let row = to_rule_row(rule)?;
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(pricing_rules::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PricingRepositoryError::DuplicateRule(rule_id)
                    }
                    _ => PricingRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_rule(&self, id: PricingRuleId) -> PricingRepositoryResult<Option<PricingRule>> {
        run_blocking(&self.pool, move |connection| {
            let row = pricing_rules::table
                .filter(pricing_rules::id.eq(id.into_inner()))
                .select(PricingRuleRow::as_select())
                .first::<PricingRuleRow>(connection)
                .optional()
                .map_err(PricingRepositoryError::persistence)?;
            Ok(row.map(row_to_rule))
        })
        .await
    }

    async fn active_rule(&self) -> PricingRepositoryResult<Option<PricingRule>> {
        run_blocking(&self.pool, move |connection| {
            let row = pricing_rules::table
                .filter(pricing_rules::is_active.eq(true))
                .select(PricingRuleRow::as_select())
                .first::<PricingRuleRow>(connection)
                .optional()
                .map_err(PricingRepositoryError::persistence)?;
            Ok(row.map(row_to_rule))
        })
        .await
    }

    async fn list_rules(&self) -> PricingRepositoryResult<Vec<PricingRule>> {
        run_blocking(&self.pool, move |connection| {
            let rows = pricing_rules::table
                .order(pricing_rules::created_at.asc())
                .select(PricingRuleRow::as_select())
                .load::<PricingRuleRow>(connection)
                .map_err(PricingRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_rule).collect())
        })
        .await
    }

    async fn activate_rule(&self, id: PricingRuleId) -> PricingRepositoryResult<PricingRule> {
        let target = id.into_inner();
        run_blocking(&self.pool, move |connection| {
            let activated = connection
                .transaction::<_, DieselError, _>(|tx| {
                    // Serializes concurrent activations; readers are not blocked.
                    diesel::sql_query("LOCK TABLE pricing_rules IN SHARE ROW EXCLUSIVE MODE")
                        .execute(tx)?;
                    let exists = pricing_rules::table
                        .filter(pricing_rules::id.eq(target))
                        .select(pricing_rules::id)
                        .first::<uuid::Uuid>(tx)
                        .optional()?;
                    if exists.is_none() {
                        return Ok(None);
                    }
                    diesel::update(
                        pricing_rules::table
                            .filter(pricing_rules::is_active.eq(true))
                            .filter(pricing_rules::id.ne(target)),
                    )
                    .set(pricing_rules::is_active.eq(false))
                    .execute(tx)?;
                    let row = diesel::update(pricing_rules::table.filter(pricing_rules::id.eq(target)))
                        .set(pricing_rules::is_active.eq(true))
                        .returning(PricingRuleRow::as_returning())
                        .get_result::<PricingRuleRow>(tx)?;
                    Ok(Some(row))
                })
                .map_err(PricingRepositoryError::persistence)?;
            activated
                .map(row_to_rule)
                .ok_or(PricingRepositoryError::RuleNotFound(id))
        })
        .await
    }

    async fn upsert_rate(&self, rate: &ServiceRate) -> PricingRepositoryResult<()> {
        let row = ServiceRateRow {
            service_type: rate.service_type().as_str().to_owned(),
            base_price_cents: to_minor_units(rate.base_price(), CENTS)
                .map_err(PricingRepositoryError::persistence)?,
            extra_fee_cents: to_minor_units(rate.extra_fee(), CENTS)
                .map_err(PricingRepositoryError::persistence)?,
            updated_at: rate.updated_at(),
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(service_rates::table)
                .values(&row)
                .on_conflict(service_rates::service_type)
                .do_update()
                .set((
                    service_rates::base_price_cents.eq(excluded(service_rates::base_price_cents)),
                    service_rates::extra_fee_cents.eq(excluded(service_rates::extra_fee_cents)),
                    service_rates::updated_at.eq(excluded(service_rates::updated_at)),
                ))
                .execute(connection)
                .map_err(PricingRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_rate(
        &self,
        service_type: ServiceType,
    ) -> PricingRepositoryResult<Option<ServiceRate>> {
        run_blocking(&self.pool, move |connection| {
            let row = service_rates::table
                .filter(service_rates::service_type.eq(service_type.as_str()))
                .select(ServiceRateRow::as_select())
                .first::<ServiceRateRow>(connection)
                .optional()
                .map_err(PricingRepositoryError::persistence)?;
            row.map(row_to_rate).transpose()
        })
        .await
    }
}

fn to_rule_row(rule: &PricingRule) -> PricingRepositoryResult<PricingRuleRow> {
    let cents = |amount| to_minor_units(amount, CENTS).map_err(PricingRepositoryError::persistence);
    Ok(PricingRuleRow {
        id: rule.id().into_inner(),
        name: rule.name().to_owned(),
        base_exit_fee_cents: cents(rule.base_exit_fee())?,
        included_meters: to_minor_units(rule.included_km(), METERS)
            .map_err(PricingRepositoryError::persistence)?,
        price_per_km_light_cents: cents(rule.price_per_km(TowType::Light))?,
        price_per_km_heavy_cents: cents(rule.price_per_km(TowType::Heavy))?,
        is_active: rule.is_active(),
        created_at: rule.created_at(),
    })
}

fn row_to_rule(row: PricingRuleRow) -> PricingRule {
    PricingRule::from_persisted(PersistedPricingRuleData {
        id: PricingRuleId::from_uuid(row.id),
        values: NewPricingRule {
            name: row.name,
            base_exit_fee: from_minor_units(row.base_exit_fee_cents, CENTS),
            included_km: from_minor_units(row.included_meters, METERS),
            price_per_km_light: from_minor_units(row.price_per_km_light_cents, CENTS),
            price_per_km_heavy: from_minor_units(row.price_per_km_heavy_cents, CENTS),
        },
        is_active: row.is_active,
        created_at: row.created_at,
    })
}

fn row_to_rate(row: ServiceRateRow) -> PricingRepositoryResult<ServiceRate> {
    let service_type = ServiceType::try_from(row.service_type.as_str())
        .map_err(PricingRepositoryError::persistence)?;
    ServiceRate::new(
        service_type,
        from_minor_units(row.base_price_cents, CENTS),
        from_minor_units(row.extra_fee_cents, CENTS),
        row.updated_at,
    )
    .map_err(PricingRepositoryError::persistence)
}
