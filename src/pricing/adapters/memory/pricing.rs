//! In-memory repository for pricing rules and rates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::pricing::{
    domain::{PricingRule, PricingRuleId, ServiceRate},
    ports::{PricingRepository, PricingRepositoryError, PricingRepositoryResult},
};
use crate::request::domain::ServiceType;

/// Thread-safe in-memory pricing repository.
///
/// Activation flips every rule's flag under one write lock, which is what
/// makes it atomic for readers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPricingRepository {
    state: Arc<RwLock<InMemoryPricingState>>,
}

#[derive(Debug, Default)]
struct InMemoryPricingState {
    rules: Vec<PricingRule>,
    rates: HashMap<ServiceType, ServiceRate>,
}

impl InMemoryPricingRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(message: String) -> PricingRepositoryError {
    PricingRepositoryError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl PricingRepository for InMemoryPricingRepository {
    async fn store_rule(&self, rule: &PricingRule) -> PricingRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        if state.rules.iter().any(|existing| existing.id() == rule.id()) {
            return Err(PricingRepositoryError::DuplicateRule(rule.id()));
        }
        state.rules.push(rule.clone());
        Ok(())
    }

    async fn find_rule(&self, id: PricingRuleId) -> PricingRepositoryResult<Option<PricingRule>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.rules.iter().find(|rule| rule.id() == id).cloned())
    }

    async fn active_rule(&self) -> PricingRepositoryResult<Option<PricingRule>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.rules.iter().find(|rule| rule.is_active()).cloned())
    }

    async fn list_rules(&self) -> PricingRepositoryResult<Vec<PricingRule>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.rules.clone())
    }

    async fn activate_rule(&self, id: PricingRuleId) -> PricingRepositoryResult<PricingRule> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        if !state.rules.iter().any(|rule| rule.id() == id) {
            return Err(PricingRepositoryError::RuleNotFound(id));
        }
        let mut activated = None;
        for rule in &mut state.rules {
            let is_target = rule.id() == id;
            rule.set_active(is_target);
            if is_target {
                activated = Some(rule.clone());
            }
        }
        activated.ok_or(PricingRepositoryError::RuleNotFound(id))
    }

    async fn upsert_rate(&self, rate: &ServiceRate) -> PricingRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        state.rates.insert(rate.service_type(), rate.clone());
        Ok(())
    }

    async fn find_rate(
        &self,
        service_type: ServiceType,
    ) -> PricingRepositoryResult<Option<ServiceRate>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.rates.get(&service_type).cloned())
    }
}
