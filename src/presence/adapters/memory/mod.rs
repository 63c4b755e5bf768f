//! In-memory presence adapters.

mod locations;

pub use locations::InMemoryPresenceRepository;
