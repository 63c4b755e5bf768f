//! Adapter implementations for presence ports.

pub mod memory;
pub mod postgres;
