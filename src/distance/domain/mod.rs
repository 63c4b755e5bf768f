//! Domain model for distance estimation.

mod error;
mod estimate;
mod geo;

pub use error::DistanceError;
pub use estimate::{
    DistanceEstimate, EstimateMode, ParseEstimateModeError, ROAD_CORRECTION_FACTOR, RouteKey,
};
pub use geo::{BoundingBox, EARTH_RADIUS_KM, GeoPoint, TripPolicy, haversine_km};
