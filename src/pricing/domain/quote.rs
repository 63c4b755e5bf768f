//! Price quotes and their structured breakdowns.

use super::PricingRuleId;
use crate::distance::domain::GeoPoint;
use crate::request::domain::{ServiceDetails, ServiceType, TowType};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds an amount to currency precision (two places, half away from zero).
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of surcharge units for an on-site service.
///
/// A tire customer without a spare pays one unit; fuel delivery pays one
/// unit per gallon beyond the first. Everything else has none.
#[must_use]
pub const fn extra_units(service_type: ServiceType, details: &ServiceDetails) -> u32 {
    match (service_type, details) {
        (ServiceType::Tire, ServiceDetails::Tire { has_spare: false }) => 1,
        (ServiceType::Fuel, ServiceDetails::Fuel { gallons }) => gallons.saturating_sub(1),
        _ => 0,
    }
}

/// Computed price with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Total price, rounded to two decimals.
    pub total: Decimal,
    /// How the total was derived.
    pub breakdown: PriceBreakdown,
}

/// Structured derivation of a [`PriceQuote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceBreakdown {
    /// Distance pricing from the active rule.
    Tow {
        /// Rule used for the quote.
        rule_id: PricingRuleId,
        /// Flat fee charged for dispatching a truck.
        base_exit_fee: Decimal,
        /// Kilometers covered by the exit fee.
        included_km: Decimal,
        /// Trip distance used, rounded to two decimals.
        distance_km: Decimal,
        /// Kilometers charged at the per-km rate.
        billable_km: Decimal,
        /// Truck class the rate was chosen for.
        tow_type: TowType,
        /// Per-kilometer rate applied.
        price_per_km: Decimal,
        /// `true` when the distance came from the fallback estimator.
        distance_is_approximate: bool,
    },
    /// Flat pricing for on-site services.
    Flat {
        /// Service priced.
        service_type: ServiceType,
        /// Flat base price.
        base_price: Decimal,
        /// Fee per surcharge unit.
        extra_fee: Decimal,
        /// Surcharge units applied.
        extra_units: u32,
    },
}

/// Everything needed to price a request.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput {
    /// Requested service.
    pub service_type: ServiceType,
    /// Truck class for tows.
    pub tow_type: Option<TowType>,
    /// Service-specific details.
    pub details: ServiceDetails,
    /// Pickup location.
    pub pickup: GeoPoint,
    /// Dropoff location (equal to pickup for on-site services).
    pub dropoff: GeoPoint,
}
