//! Estimate values, estimation modes, and cache keys.

use super::{GeoPoint, haversine_km};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Multiplier applied to great-circle distance to approximate road distance.
pub const ROAD_CORRECTION_FACTOR: f64 = 1.3;

/// What an estimate is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMode {
    /// Pickup-to-dropoff distance used for pricing; no traffic.
    TripPlanning,
    /// Operator arrival time with departure "now" and live traffic.
    TrafficEta,
}

impl EstimateMode {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TripPlanning => "trip_planning",
            Self::TrafficEta => "traffic_eta",
        }
    }

    /// Average speed assumed by the fallback estimate, in km/h.
    #[must_use]
    pub const fn fallback_speed_kmh(self) -> f64 {
        match self {
            Self::TripPlanning => 30.0,
            Self::TrafficEta => 25.0,
        }
    }
}

impl TryFrom<&str> for EstimateMode {
    type Error = ParseEstimateModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trip_planning" => Ok(Self::TripPlanning),
            "traffic_eta" => Ok(Self::TrafficEta),
            _ => Err(ParseEstimateModeError(value.to_owned())),
        }
    }
}

impl fmt::Display for EstimateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing an estimate mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown estimate mode: {0}")]
pub struct ParseEstimateModeError(pub String);

/// Driving distance and duration between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate {
    /// Road distance in kilometers.
    pub distance_km: f64,
    /// Driving time in minutes.
    pub duration_minutes: f64,
    /// `true` when the figures come from the geometric fallback.
    pub is_fallback: bool,
    /// Mode the estimate was produced for.
    pub mode: EstimateMode,
}

impl DistanceEstimate {
    /// Wraps a provider measurement.
    #[must_use]
    pub const fn measured(distance_km: f64, duration_minutes: f64, mode: EstimateMode) -> Self {
        Self {
            distance_km,
            duration_minutes,
            is_fallback: false,
            mode,
        }
    }

    /// Builds the geometric fallback: haversine distance times the road
    /// correction factor, timed at the mode's assumed average speed.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "fallback estimate is defined in floating-point terms"
    )]
    pub fn fallback(origin: GeoPoint, destination: GeoPoint, mode: EstimateMode) -> Self {
        let distance_km = haversine_km(origin, destination) * ROAD_CORRECTION_FACTOR;
        let duration_minutes = distance_km / mode.fallback_speed_kmh() * 60.0;
        Self {
            distance_km,
            duration_minutes,
            is_fallback: true,
            mode,
        }
    }
}

/// Cache key: mode plus both endpoints rounded to four decimal places.
///
/// Four decimals is roughly 11 m, enough to absorb GPS jitter between
/// repeated lookups of the same trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    mode: EstimateMode,
    origin: (i64, i64),
    destination: (i64, i64),
}

impl RouteKey {
    /// Builds the key for a trip.
    #[must_use]
    pub fn new(mode: EstimateMode, origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            mode,
            origin: (quantize(origin.lat()), quantize(origin.lng())),
            destination: (quantize(destination.lat()), quantize(destination.lng())),
        }
    }

    /// Returns the mode component.
    #[must_use]
    pub const fn mode(&self) -> EstimateMode {
        self.mode
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.mode, self.origin.0, self.origin.1, self.destination.0, self.destination.1
        )
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "validated coordinates scaled by 1e4 fit comfortably in i64"
)]
fn quantize(degrees: f64) -> i64 {
    (degrees * 10_000.0).round() as i64
}
