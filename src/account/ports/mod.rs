//! Port contracts for account persistence.

mod repository;

pub use repository::{AccountRepository, AccountRepositoryError, AccountRepositoryResult};
