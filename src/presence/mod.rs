//! Operator presence: last known location and whether it can be trusted.
//!
//! Each operator has one location row that every heartbeat overwrites.
//! Readers classify it as live, stale (online but silent too long), offline
//! (explicit sign-off), or unknown.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
