//! Service classification and locations.

use super::{ParseServiceTypeError, ParseTowTypeError};
use crate::distance::domain::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest fuel delivery accepted, in gallons.
pub const MAX_FUEL_GALLONS: u32 = 20;

/// Kind of assistance requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Vehicle towed from pickup to dropoff.
    Tow,
    /// Jump start or battery replacement.
    Battery,
    /// Tire change or repair.
    Tire,
    /// Fuel delivery.
    Fuel,
    /// Lockout assistance.
    Locksmith,
}

impl ServiceType {
    /// Every service type.
    pub const ALL: [Self; 5] = [
        Self::Tow,
        Self::Battery,
        Self::Tire,
        Self::Fuel,
        Self::Locksmith,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tow => "tow",
            Self::Battery => "battery",
            Self::Tire => "tire",
            Self::Fuel => "fuel",
            Self::Locksmith => "locksmith",
        }
    }

    /// Returns `true` for services delivered at the pickup location.
    #[must_use]
    pub const fn is_on_site(self) -> bool {
        !matches!(self, Self::Tow)
    }
}

impl TryFrom<&str> for ServiceType {
    type Error = ParseServiceTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tow" => Ok(Self::Tow),
            "battery" => Ok(Self::Battery),
            "tire" => Ok(Self::Tire),
            "fuel" => Ok(Self::Fuel),
            "locksmith" => Ok(Self::Locksmith),
            _ => Err(ParseServiceTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truck class for tows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowType {
    /// Cars and light vans.
    Light,
    /// Trucks and buses.
    Heavy,
}

impl TowType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Heavy => "heavy",
        }
    }
}

impl TryFrom<&str> for TowType {
    type Error = ParseTowTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "heavy" => Ok(Self::Heavy),
            _ => Err(ParseTowTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for TowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-specific details captured at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceDetails {
    /// Nothing beyond the service type.
    #[default]
    None,
    /// Tire service.
    Tire {
        /// Whether the customer carries a usable spare.
        has_spare: bool,
    },
    /// Fuel delivery.
    Fuel {
        /// Gallons requested.
        gallons: u32,
    },
}

/// A point on the map with an optional human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Coordinates.
    pub point: GeoPoint,
    /// Street address as entered or geocoded.
    pub address: Option<String>,
}

impl Place {
    /// Creates a place without an address.
    #[must_use]
    pub const fn new(point: GeoPoint) -> Self {
        Self {
            point,
            address: None,
        }
    }

    /// Attaches an address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}
