//! Adapter implementations for distance ports.

pub mod cache;
mod google;

pub use google::GoogleDistanceMatrixProvider;
