//! In-memory pricing adapters.

mod pricing;

pub use pricing::InMemoryPricingRepository;
