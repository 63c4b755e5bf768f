//! Driving distance and ETA estimation.
//!
//! Estimates come from an external distance-matrix provider when one is
//! configured and answers in time. Every other outcome (missing key,
//! transport failure, timeout, non-`OK` element status) degrades to a
//! great-circle estimate scaled by a road correction factor and tagged
//! `is_fallback = true`, so callers can present the figure as approximate.
//!
//! Coordinates are validated against the configured service area and a
//! minimum trip length before any provider traffic happens. Provider results
//! are cached under coordinates rounded to four decimal places.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
