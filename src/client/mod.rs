//! Client-side access to the dispatch core.
//!
//! [`DispatchBackend`] lists every remote procedure. [`LocalBackend`] calls
//! the services in-process and [`HttpBackend`] goes through the RPC
//! surface; both surface the same error codes. On top of a backend sit the
//! role workflows ([`UserSession`], [`OperatorSession`]), the active
//! request mirror ([`RequestSync`]) and the operator position stream
//! ([`LocationTracker`]).

mod backend;
mod http;
mod local;
mod pin_store;
mod session;
mod sync;
mod tracking;

pub use backend::{BackendError, BackendResult, DispatchBackend, NO_LONGER_AVAILABLE};
pub use http::HttpBackend;
pub use local::LocalBackend;
pub use pin_store::{FilePinStore, MemoryPinStore, PinStore, PinStoreError, PinStoreResult};
pub use session::{
    ClaimOutcome, ClientError, ClientResult, CreatedRequest, OperatorSession, UserSession,
};
pub use sync::RequestSync;
pub use tracking::LocationTracker;

#[cfg(test)]
pub(crate) use backend::MockDispatchBackend;
#[cfg(test)]
pub(crate) use pin_store::MockPinStore;

#[cfg(test)]
mod tests;
