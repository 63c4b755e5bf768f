//! Port contracts for pricing persistence.

mod repository;

pub use repository::{PricingRepository, PricingRepositoryError, PricingRepositoryResult};
