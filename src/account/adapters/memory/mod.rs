//! In-memory account adapters.

mod accounts;

pub use accounts::InMemoryAccountRepository;
