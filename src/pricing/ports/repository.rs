//! Repository port for pricing rules and flat service rates.

use crate::pricing::domain::{PricingRule, PricingRuleId, ServiceRate};
use crate::request::domain::ServiceType;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pricing repository operations.
pub type PricingRepositoryResult<T> = Result<T, PricingRepositoryError>;

/// Pricing persistence contract.
#[async_trait]
pub trait PricingRepository: Send + Sync {
    /// Stores a new rule exactly as given (normally inactive).
    ///
    /// # Errors
    ///
    /// Returns [`PricingRepositoryError::DuplicateRule`] when the identifier
    /// already exists.
    async fn store_rule(&self, rule: &PricingRule) -> PricingRepositoryResult<()>;

    /// Finds a rule by identifier.
    async fn find_rule(&self, id: PricingRuleId) -> PricingRepositoryResult<Option<PricingRule>>;

    /// Returns the active rule, if one has been activated.
    async fn active_rule(&self) -> PricingRepositoryResult<Option<PricingRule>>;

    /// Returns every rule, oldest first.
    async fn list_rules(&self) -> PricingRepositoryResult<Vec<PricingRule>>;

    /// Makes `id` the only active rule in a single atomic step.
    ///
    /// Observers never see zero or several active rules.
    ///
    /// # Errors
    ///
    /// Returns [`PricingRepositoryError::RuleNotFound`] when the rule does
    /// not exist; the previously active rule stays active in that case.
    async fn activate_rule(&self, id: PricingRuleId) -> PricingRepositoryResult<PricingRule>;

    /// Inserts or replaces the flat rate for a service type.
    async fn upsert_rate(&self, rate: &ServiceRate) -> PricingRepositoryResult<()>;

    /// Finds the flat rate for a service type.
    async fn find_rate(
        &self,
        service_type: ServiceType,
    ) -> PricingRepositoryResult<Option<ServiceRate>>;
}

/// Errors returned by pricing repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PricingRepositoryError {
    /// A rule with the same identifier already exists.
    #[error("duplicate pricing rule: {0}")]
    DuplicateRule(PricingRuleId),

    /// The rule was not found.
    #[error("pricing rule not found: {0}")]
    RuleNotFound(PricingRuleId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PricingRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
