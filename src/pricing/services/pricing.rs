//! Pricing administration and quote computation.

use crate::account::domain::{Actor, Role};
use crate::distance::{domain::DistanceError, services::DistanceEstimator};
use crate::pricing::{
    domain::{
        NewPricingRule, PriceQuote, PricingDomainError, PricingRule, PricingRuleId, QuoteInput,
        ServiceRate,
    },
    ports::{PricingRepository, PricingRepositoryError},
};
use crate::request::{
    domain::{ServiceType, TowType},
    ports::{TripQuoteError, TripQuoter},
};
use async_trait::async_trait;
use mockable::Clock;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for pricing operations.
#[derive(Debug, Error)]
pub enum PricingServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PricingDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PricingRepositoryError),
    /// Trip coordinates were rejected.
    #[error(transparent)]
    Distance(#[from] DistanceError),
    /// The caller is not allowed to perform the operation.
    #[error("role {0} may not manage pricing")]
    Forbidden(Role),
    /// No pricing rule has been activated yet.
    #[error("no active pricing rule")]
    NoActiveRule,
    /// No flat rate is configured for the service type.
    #[error("no rate configured for service type {0}")]
    NoRate(ServiceType),
    /// A tow quote was requested without a truck class.
    #[error("tow quotes require a tow type")]
    MissingTowType,
}

/// Result type for pricing service operations.
pub type PricingServiceResult<T> = Result<T, PricingServiceError>;

/// Pricing service.
///
/// Rule and rate changes are restricted to administrators. Quotes are
/// available to any caller and drive the price attached to a new request.
#[derive(Clone)]
pub struct PricingService<R, C>
where
    R: PricingRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    estimator: Arc<DistanceEstimator>,
    clock: Arc<C>,
}

impl<R, C> PricingService<R, C>
where
    R: PricingRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new pricing service.
    #[must_use]
    pub const fn new(repository: Arc<R>, estimator: Arc<DistanceEstimator>, clock: Arc<C>) -> Self {
        Self {
            repository,
            estimator,
            clock,
        }
    }

    /// Creates an inactive pricing rule.
    ///
    /// # Errors
    ///
    /// Returns [`PricingServiceError::Forbidden`] for non-admin callers and
    /// [`PricingServiceError::Domain`] for invalid values.
    pub async fn create_rule(
        &self,
        actor: &Actor,
        values: NewPricingRule,
    ) -> PricingServiceResult<PricingRule> {
        ensure_admin(actor)?;
        let rule = PricingRule::new(values, &*self.clock)?;
        self.repository.store_rule(&rule).await?;
        info!(rule_id = %rule.id(), name = rule.name(), "created pricing rule");
        Ok(rule)
    }

    /// Makes `rule_id` the only active rule.
    ///
    /// # Errors
    ///
    /// Returns [`PricingServiceError::Forbidden`] for non-admin callers and
    /// [`PricingRepositoryError::RuleNotFound`] for unknown rules, in which
    /// case the current active rule is untouched.
    pub async fn set_active_rule(
        &self,
        actor: &Actor,
        rule_id: PricingRuleId,
    ) -> PricingServiceResult<PricingRule> {
        ensure_admin(actor)?;
        let rule = self.repository.activate_rule(rule_id).await?;
        info!(rule_id = %rule_id, admin_id = %actor.user_id(), "activated pricing rule");
        Ok(rule)
    }

    /// Returns the active rule, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PricingServiceError::Repository`] when the lookup fails.
    pub async fn active_rule(&self) -> PricingServiceResult<Option<PricingRule>> {
        Ok(self.repository.active_rule().await?)
    }

    /// Lists every rule for administrators.
    ///
    /// # Errors
    ///
    /// Returns [`PricingServiceError::Forbidden`] for non-admin callers.
    pub async fn list_rules(&self, actor: &Actor) -> PricingServiceResult<Vec<PricingRule>> {
        ensure_admin(actor)?;
        Ok(self.repository.list_rules().await?)
    }

    /// Inserts or replaces the flat rate for a non-tow service.
    ///
    /// # Errors
    ///
    /// Returns [`PricingServiceError::Forbidden`] for non-admin callers and
    /// [`PricingServiceError::Domain`] for tows or negative amounts.
    pub async fn upsert_rate(
        &self,
        actor: &Actor,
        service_type: ServiceType,
        base_price: Decimal,
        extra_fee: Decimal,
    ) -> PricingServiceResult<ServiceRate> {
        ensure_admin(actor)?;
        let rate = ServiceRate::new(service_type, base_price, extra_fee, self.clock.utc())?;
        self.repository.upsert_rate(&rate).await?;
        info!(%service_type, %base_price, %extra_fee, "updated service rate");
        Ok(rate)
    }

    /// Computes the price for a prospective request.
    ///
    /// Tows use the active rule and the trip-planning distance between
    /// pickup and dropoff; a trip shorter than the minimum length is priced
    /// at zero kilometers. Other services use their flat rate.
    ///
    /// # Errors
    ///
    /// Returns [`PricingServiceError::NoActiveRule`],
    /// [`PricingServiceError::NoRate`] or
    /// [`PricingServiceError::MissingTowType`] when pricing data is missing,
    /// and [`PricingServiceError::Distance`] for points outside the service
    /// area.
    pub async fn quote(&self, input: &QuoteInput) -> PricingServiceResult<PriceQuote> {
        if input.service_type == ServiceType::Tow {
            let tow_type = input.tow_type.ok_or(PricingServiceError::MissingTowType)?;
            return self.quote_tow(input, tow_type).await;
        }
        let rate = self
            .repository
            .find_rate(input.service_type)
            .await?
            .ok_or(PricingServiceError::NoRate(input.service_type))?;
        Ok(rate.quote(&input.details))
    }

    async fn quote_tow(
        &self,
        input: &QuoteInput,
        tow_type: TowType,
    ) -> PricingServiceResult<PriceQuote> {
        let rule = self
            .repository
            .active_rule()
            .await?
            .ok_or(PricingServiceError::NoActiveRule)?;
        let (distance_km, approximate) = match self
            .estimator
            .trip_distance(input.pickup, input.dropoff)
            .await
        {
            Ok(estimate) => (estimate.distance_km, estimate.is_fallback),
            Err(DistanceError::TooClose { meters, .. }) => {
                debug!(meters, "tow trip below minimum length, pricing at 0 km");
                (0.0, false)
            }
            Err(err) => return Err(err.into()),
        };
        let distance = Decimal::from_f64(distance_km)
            .ok_or_else(|| PricingDomainError::InvalidDistance(distance_km.to_string()))?;
        Ok(rule.quote_tow(distance, tow_type, approximate))
    }
}

#[async_trait]
impl<R, C> TripQuoter for PricingService<R, C>
where
    R: PricingRepository + ?Sized,
    C: Clock + Send + Sync,
{
    async fn quote(&self, input: &QuoteInput) -> Result<PriceQuote, TripQuoteError> {
        Self::quote(self, input).await.map_err(TripQuoteError::new)
    }
}

fn ensure_admin(actor: &Actor) -> PricingServiceResult<()> {
    if actor.has_role(Role::Admin) {
        Ok(())
    } else {
        Err(PricingServiceError::Forbidden(actor.role()))
    }
}
