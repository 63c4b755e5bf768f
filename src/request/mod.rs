//! Service requests: the dispatch lifecycle and everything hanging off it.
//!
//! A request moves `initiated -> assigned -> en_route -> active ->
//! completed`, with cancellation allowed up to `en_route`. Operators claim
//! unassigned requests through a conditional write, so concurrent accepts
//! have exactly one winner. Arrival is confirmed with a four-digit PIN that
//! is stored hashed and guarded by an attempt counter. Ratings and chat
//! messages hang off a request and follow its status.
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
