//! Adapter implementations for pricing ports.

pub mod memory;
pub mod postgres;
