//! Error types for pricing validation.

use crate::request::domain::ServiceType;
use thiserror::Error;

/// Errors returned while constructing pricing values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingDomainError {
    /// The rule name is empty after trimming.
    #[error("pricing rule name must not be empty")]
    EmptyRuleName,

    /// A monetary or distance amount is negative.
    #[error("{field} must not be negative")]
    NegativeAmount {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Tow trips are priced by rules, not flat rates.
    #[error("service type {0} is priced by the active pricing rule")]
    FlatRateNotApplicable(ServiceType),

    /// The trip distance could not be represented exactly.
    #[error("trip distance {0} is not a finite number")]
    InvalidDistance(String),
}
