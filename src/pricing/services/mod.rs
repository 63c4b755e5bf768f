//! Application services for pricing.

mod pricing;

pub use pricing::{PricingService, PricingServiceError, PricingServiceResult};
