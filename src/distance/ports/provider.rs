//! External driving distance provider port.

use crate::distance::domain::{EstimateMode, GeoPoint};
use async_trait::async_trait;
use thiserror::Error;

/// Distance and duration reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMeasurement {
    /// Road distance in kilometers.
    pub distance_km: f64,
    /// Driving time in minutes, traffic-aware for [`EstimateMode::TrafficEta`].
    pub duration_minutes: f64,
}

/// Driving distance provider contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Measures the driving route between two points.
    ///
    /// # Errors
    ///
    /// Returns [`RouteProviderError`] for any failure; callers treat every
    /// variant as recoverable.
    async fn measure(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: EstimateMode,
    ) -> Result<RouteMeasurement, RouteProviderError>;
}

/// Failures reported by route providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteProviderError {
    /// No credential is configured for the provider.
    #[error("route provider is not configured")]
    NotConfigured,
    /// The request could not be sent or the response not received.
    #[error("route provider transport failure: {0}")]
    Transport(String),
    /// The provider answered with a non-`OK` status.
    #[error("route provider returned status {0}")]
    Status(String),
    /// The response body could not be interpreted.
    #[error("malformed route provider response: {0}")]
    Malformed(String),
}
