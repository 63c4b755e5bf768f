//! Price computation and the system-wide active pricing rule.
//!
//! Tow trips are priced from the single active [`domain::PricingRule`]:
//! a base exit fee plus a per-kilometer rate (by tow type) beyond an
//! included allowance. On-site services use a flat [`domain::ServiceRate`]
//! plus an extra fee per surcharge unit. All amounts are exact decimals
//! rounded to two places.
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
