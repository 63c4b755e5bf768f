//! Towline: dispatch core for a roadside-assistance marketplace.
//!
//! Customers request a tow or an on-site service, operators employed by a
//! provider claim and work those requests, and administrators manage
//! pricing and roles. This crate owns the canonical request state and the
//! rules around it: the lifecycle state machine, arrival PIN verification,
//! exclusive claims, pricing, distance estimation with a geometric
//! fallback, and operator presence.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//! - **Services**: Orchestration over ports, taking an authenticated actor
//!
//! # Modules
//!
//! - [`account`]: Roles, profiles, providers, and role administration
//! - [`request`]: Service request lifecycle, PINs, ratings, and chat
//! - [`pricing`]: Pricing rules, flat rates, and quotes
//! - [`distance`]: Distance and ETA estimation with caching and fallback
//! - [`presence`]: Operator location and online state
//! - [`dispatch`]: Composition root wiring every service
//! - [`rpc`]: HTTP surface exposing the named remote procedures
//! - [`client`]: Client-side guards, PIN storage, and change-driven refresh

pub mod account;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod distance;
mod ids;
pub mod persistence;
pub mod presence;
pub mod pricing;
pub mod request;
pub mod rpc;
pub mod telemetry;
