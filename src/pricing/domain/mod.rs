//! Domain model for pricing.

mod error;
mod ids;
mod quote;
mod rate;
mod rule;

pub use error::PricingDomainError;
pub use ids::PricingRuleId;
pub use quote::{PriceBreakdown, PriceQuote, QuoteInput, extra_units, round_currency};
pub use rate::ServiceRate;
pub use rule::{NewPricingRule, PersistedPricingRuleData, PricingRule};
