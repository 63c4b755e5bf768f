//! `PostgreSQL` adapters for request persistence.

mod feedback;
mod models;
mod repository;
mod schema;

pub use feedback::PostgresFeedbackRepository;
pub use repository::PostgresServiceRequestRepository;
