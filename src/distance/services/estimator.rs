//! Cached, time-bounded distance estimation with geometric fallback.

use crate::distance::{
    domain::{DistanceError, DistanceEstimate, EstimateMode, GeoPoint, RouteKey, TripPolicy},
    ports::{DistanceCache, RouteProvider},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Validation and timeout settings for [`DistanceEstimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorPolicy {
    /// Service-area and minimum-length rules.
    pub trip: TripPolicy,
    /// Upper bound on a single provider call.
    pub provider_timeout: Duration,
}

impl Default for EstimatorPolicy {
    fn default() -> Self {
        Self {
            trip: TripPolicy::default(),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

/// Distance and ETA estimator.
///
/// Validation failures are returned as errors. Provider failures of any
/// kind, including exceeding the timeout, produce a fallback estimate.
/// Only provider measurements are cached, so a recovered provider is used
/// again on the next lookup.
#[derive(Clone)]
pub struct DistanceEstimator {
    provider: Arc<dyn RouteProvider>,
    cache: Arc<dyn DistanceCache>,
    policy: EstimatorPolicy,
}

impl DistanceEstimator {
    /// Creates an estimator.
    #[must_use]
    pub const fn new(
        provider: Arc<dyn RouteProvider>,
        cache: Arc<dyn DistanceCache>,
        policy: EstimatorPolicy,
    ) -> Self {
        Self {
            provider,
            cache,
            policy,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &EstimatorPolicy {
        &self.policy
    }

    /// Estimates the pickup-to-dropoff driving distance for pricing.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] when either point is outside the service
    /// area or the trip is shorter than the configured minimum.
    pub async fn trip_distance(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<DistanceEstimate, DistanceError> {
        self.estimate(origin, destination, EstimateMode::TripPlanning)
            .await
    }

    /// Estimates the traffic-aware arrival time from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] under the same conditions as
    /// [`Self::trip_distance`].
    pub async fn eta(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<DistanceEstimate, DistanceError> {
        self.estimate(origin, destination, EstimateMode::TrafficEta)
            .await
    }

    /// Estimates a route in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] when validation fails; never for provider
    /// or cache failures.
    pub async fn estimate(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: EstimateMode,
    ) -> Result<DistanceEstimate, DistanceError> {
        self.policy.trip.validate(origin, destination)?;
        let key = RouteKey::new(mode, origin, destination);

        match self.cache.get(&key).await {
            Ok(Some(hit)) => {
                debug!(%key, "distance cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(err) => warn!(%key, error = %err, "distance cache read failed"),
        }

        let measured = tokio::time::timeout(
            self.policy.provider_timeout,
            self.provider.measure(origin, destination, mode),
        )
        .await;
        let estimate = match measured {
            Ok(Ok(measurement)) => DistanceEstimate::measured(
                measurement.distance_km,
                measurement.duration_minutes,
                mode,
            ),
            Ok(Err(err)) => {
                warn!(%mode, error = %err, "route provider failed, using fallback estimate");
                return Ok(DistanceEstimate::fallback(origin, destination, mode));
            }
            Err(_elapsed) => {
                warn!(
                    %mode,
                    timeout_ms = self.policy.provider_timeout.as_millis(),
                    "route provider timed out, using fallback estimate"
                );
                return Ok(DistanceEstimate::fallback(origin, destination, mode));
            }
        };

        if let Err(err) = self.cache.put(&key, &estimate).await {
            warn!(%key, error = %err, "distance cache write failed");
        }
        Ok(estimate)
    }
}
