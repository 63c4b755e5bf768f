//! Estimate cache adapters: a fast in-memory tier, a durable file tier, and
//! the tiered combination of both.

mod file;
mod memory;
mod tiered;

pub use file::FileDistanceCache;
pub use memory::InMemoryDistanceCache;
pub use tiered::TieredDistanceCache;
