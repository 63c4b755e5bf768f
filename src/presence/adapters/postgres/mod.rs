//! `PostgreSQL` adapters for presence persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresPresenceRepository;
