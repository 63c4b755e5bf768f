//! Port contracts for route providers and estimate caches.

mod cache;
mod provider;

pub use cache::{DistanceCache, DistanceCacheError, DistanceCacheResult};
#[cfg(test)]
pub use provider::MockRouteProvider;
pub use provider::{RouteMeasurement, RouteProvider, RouteProviderError};
