//! Application services for distance estimation.

mod estimator;

pub use estimator::{DistanceEstimator, EstimatorPolicy};
