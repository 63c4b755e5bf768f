//! `PostgreSQL` adapters for pricing persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresPricingRepository;
