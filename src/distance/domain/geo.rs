//! Coordinates, service-area bounds, and great-circle distance.

use super::DistanceError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = DistanceError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Creates a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidCoordinate`] for non-finite values,
    /// latitudes outside ±90, or longitudes outside ±180.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DistanceError> {
        let in_range = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !in_range {
            return Err(DistanceError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Returns the latitude in degrees.
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Returns the longitude in degrees.
    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }
}

/// Great-circle distance between two points in kilometers.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "haversine geometry is floating-point by nature"
)]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let half_chord = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * half_chord.sqrt().min(1.0).asin()
}

/// Latitude/longitude envelope of the area the service operates in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl BoundingBox {
    /// Creates a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidBoundingBox`] when an edge is not
    /// finite or a minimum exceeds its maximum.
    pub fn new(
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Result<Self, DistanceError> {
        let edges = [min_lat, max_lat, min_lng, max_lng];
        if edges.iter().any(|edge| !edge.is_finite()) || min_lat > max_lat || min_lng > max_lng {
            return Err(DistanceError::InvalidBoundingBox);
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Envelope of the Dominican Republic, the default service area.
    #[must_use]
    pub const fn dominican_republic() -> Self {
        Self {
            min_lat: 17.36,
            max_lat: 19.93,
            min_lng: -72.01,
            max_lng: -68.32,
        }
    }

    /// Returns `true` when `point` lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::dominican_republic()
    }
}

/// Validation rules applied to every origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripPolicy {
    /// Area both points must fall inside.
    pub service_area: BoundingBox,
    /// Minimum straight-line separation, in meters.
    pub min_trip_meters: f64,
}

impl Default for TripPolicy {
    fn default() -> Self {
        Self {
            service_area: BoundingBox::default(),
            min_trip_meters: 500.0,
        }
    }
}

impl TripPolicy {
    /// Checks a single point against the service area.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::OutOfServiceArea`] when the point is outside.
    pub fn check_point(&self, point: GeoPoint) -> Result<(), DistanceError> {
        if self.service_area.contains(point) {
            Ok(())
        } else {
            Err(DistanceError::OutOfServiceArea {
                lat: point.lat,
                lng: point.lng,
            })
        }
    }

    /// Validates a trip and returns its straight-line length in kilometers.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::OutOfServiceArea`] when either point is
    /// outside the area, or [`DistanceError::TooClose`] for degenerate trips.
    #[expect(
        clippy::float_arithmetic,
        reason = "unit conversion from kilometers to meters"
    )]
    pub fn validate(&self, origin: GeoPoint, destination: GeoPoint) -> Result<f64, DistanceError> {
        self.check_point(origin)?;
        self.check_point(destination)?;
        let straight_km = haversine_km(origin, destination);
        let meters = straight_km * 1000.0;
        if meters < self.min_trip_meters {
            return Err(DistanceError::TooClose {
                meters,
                minimum_meters: self.min_trip_meters,
            });
        }
        Ok(straight_km)
    }
}
