//! Tow pricing rules.

use super::{PriceBreakdown, PriceQuote, PricingDomainError, PricingRuleId, round_currency};
use crate::request::domain::TowType;
use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input for creating a pricing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPricingRule {
    /// Display name.
    pub name: String,
    /// Flat dispatch fee.
    pub base_exit_fee: Decimal,
    /// Kilometers covered by the exit fee.
    pub included_km: Decimal,
    /// Per-kilometer rate for light tows.
    pub price_per_km_light: Decimal,
    /// Per-kilometer rate for heavy tows.
    pub price_per_km_heavy: Decimal,
}

/// Parameter object for reconstructing a persisted rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPricingRuleData {
    /// Persisted identifier.
    pub id: PricingRuleId,
    /// Persisted rule values.
    pub values: NewPricingRule,
    /// Whether the rule is the active one.
    pub is_active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Tow pricing rule. At most one rule is active system-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    id: PricingRuleId,
    name: String,
    base_exit_fee: Decimal,
    included_km: Decimal,
    price_per_km_light: Decimal,
    price_per_km_heavy: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl PricingRule {
    /// Creates an inactive rule.
    ///
    /// # Errors
    ///
    /// Returns [`PricingDomainError`] when the name is blank or any amount
    /// is negative.
    pub fn new(values: NewPricingRule, clock: &impl Clock) -> Result<Self, PricingDomainError> {
        let name = values.name.trim();
        if name.is_empty() {
            return Err(PricingDomainError::EmptyRuleName);
        }
        let amounts = [
            ("base_exit_fee", values.base_exit_fee),
            ("included_km", values.included_km),
            ("price_per_km_light", values.price_per_km_light),
            ("price_per_km_heavy", values.price_per_km_heavy),
        ];
        if let Some(&(field, _)) = amounts.iter().find(|(_, amount)| *amount < Decimal::ZERO) {
            return Err(PricingDomainError::NegativeAmount { field });
        }
        Ok(Self {
            id: PricingRuleId::new(),
            name: name.to_owned(),
            base_exit_fee: values.base_exit_fee,
            included_km: values.included_km,
            price_per_km_light: values.price_per_km_light,
            price_per_km_heavy: values.price_per_km_heavy,
            is_active: false,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a rule from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPricingRuleData) -> Self {
        Self {
            id: data.id,
            name: data.values.name,
            base_exit_fee: data.values.base_exit_fee,
            included_km: data.values.included_km,
            price_per_km_light: data.values.price_per_km_light,
            price_per_km_heavy: data.values.price_per_km_heavy,
            is_active: data.is_active,
            created_at: data.created_at,
        }
    }

    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> PricingRuleId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the flat dispatch fee.
    #[must_use]
    pub const fn base_exit_fee(&self) -> Decimal {
        self.base_exit_fee
    }

    /// Returns the kilometers covered by the exit fee.
    #[must_use]
    pub const fn included_km(&self) -> Decimal {
        self.included_km
    }

    /// Returns the per-kilometer rate for `tow_type`.
    #[must_use]
    pub const fn price_per_km(&self, tow_type: TowType) -> Decimal {
        match tow_type {
            TowType::Light => self.price_per_km_light,
            TowType::Heavy => self.price_per_km_heavy,
        }
    }

    /// Returns `true` when this is the active rule.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the activation flag; storage adapters keep it exclusive.
    pub const fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Prices a tow:
    /// `base_exit_fee + max(0, distance_km - included_km) * price_per_km[tow_type]`.
    ///
    /// The distance is rounded to two decimals before use and negative
    /// distances are treated as zero.
    #[must_use]
    pub fn quote_tow(
        &self,
        distance_km: Decimal,
        tow_type: TowType,
        distance_is_approximate: bool,
    ) -> PriceQuote {
        let distance = round_currency(distance_km.max(Decimal::ZERO));
        let billable_km = (distance - self.included_km).max(Decimal::ZERO);
        let price_per_km = self.price_per_km(tow_type);
        let total = round_currency(self.base_exit_fee + billable_km * price_per_km);
        PriceQuote {
            total,
            breakdown: PriceBreakdown::Tow {
                rule_id: self.id,
                base_exit_fee: self.base_exit_fee,
                included_km: self.included_km,
                distance_km: distance,
                billable_km,
                tow_type,
                price_per_km,
                distance_is_approximate,
            },
        }
    }
}
