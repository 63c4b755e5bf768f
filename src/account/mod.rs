//! Accounts, roles, and authenticated actors.
//!
//! Every dispatch operation is performed on behalf of an [`domain::Actor`].
//! This module owns the profiles behind those actors, the providers
//! (fleets) operators belong to, and the administrative role changes that
//! keep the "operator iff provider" invariant intact.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
