//! Error types for coordinate and trip validation.

use thiserror::Error;

/// Validation failures for distance and ETA requests.
///
/// These are caller errors: they are reported immediately and never
/// converted into a fallback estimate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DistanceError {
    /// Latitude or longitude is not a finite value in range.
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lng: f64,
    },

    /// The bounding box has inverted or non-finite edges.
    #[error("invalid service area bounds")]
    InvalidBoundingBox,

    /// The point lies outside the configured service area.
    #[error("coordinate ({lat}, {lng}) is outside the service area")]
    OutOfServiceArea {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lng: f64,
    },

    /// The two points are too close together to form a trip.
    #[error("points are {meters:.0} m apart, minimum is {minimum_meters:.0} m")]
    TooClose {
        /// Straight-line separation in meters.
        meters: f64,
        /// Configured minimum trip length in meters.
        minimum_meters: f64,
    },
}
