//! Flat rates for on-site services.

use super::{PriceBreakdown, PriceQuote, PricingDomainError, extra_units, round_currency};
use crate::request::domain::{ServiceDetails, ServiceType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat price list entry for a non-tow service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRate {
    service_type: ServiceType,
    base_price: Decimal,
    extra_fee: Decimal,
    updated_at: DateTime<Utc>,
}

impl ServiceRate {
    /// Creates a validated flat rate.
    ///
    /// # Errors
    ///
    /// Returns [`PricingDomainError::FlatRateNotApplicable`] for tows and
    /// [`PricingDomainError::NegativeAmount`] for negative amounts.
    pub fn new(
        service_type: ServiceType,
        base_price: Decimal,
        extra_fee: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, PricingDomainError> {
        if service_type == ServiceType::Tow {
            return Err(PricingDomainError::FlatRateNotApplicable(service_type));
        }
        if base_price < Decimal::ZERO {
            return Err(PricingDomainError::NegativeAmount {
                field: "base_price",
            });
        }
        if extra_fee < Decimal::ZERO {
            return Err(PricingDomainError::NegativeAmount { field: "extra_fee" });
        }
        Ok(Self {
            service_type,
            base_price,
            extra_fee,
            updated_at,
        })
    }

    /// Returns the service this rate prices.
    #[must_use]
    pub const fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Returns the base price.
    #[must_use]
    pub const fn base_price(&self) -> Decimal {
        self.base_price
    }

    /// Returns the fee per surcharge unit.
    #[must_use]
    pub const fn extra_fee(&self) -> Decimal {
        self.extra_fee
    }

    /// Returns when the rate was last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Prices a request: `base_price + extra_fee * extra_units`.
    #[must_use]
    pub fn quote(&self, details: &ServiceDetails) -> PriceQuote {
        let units = extra_units(self.service_type, details);
        let total = round_currency(self.base_price + self.extra_fee * Decimal::from(units));
        PriceQuote {
            total,
            breakdown: PriceBreakdown::Flat {
                service_type: self.service_type,
                base_price: self.base_price,
                extra_fee: self.extra_fee,
                extra_units: units,
            },
        }
    }
}
