//! Identifier types for the pricing domain.

use crate::ids::uuid_identifier;

uuid_identifier! {
    /// Identifier of a tow pricing rule.
    PricingRuleId
}
