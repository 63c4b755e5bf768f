//! Operator location reports.

use super::PresenceDomainError;
use crate::account::domain::UserId;
use crate::distance::domain::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    point: GeoPoint,
    heading: Option<f64>,
}

impl LocationFix {
    /// Builds a fix from raw coordinates and an optional compass heading.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceDomainError::Location`] for invalid coordinates and
    /// [`PresenceDomainError::InvalidHeading`] for headings outside
    /// `[0, 360)`.
    pub fn new(lat: f64, lng: f64, heading: Option<f64>) -> Result<Self, PresenceDomainError> {
        let point = GeoPoint::new(lat, lng)?;
        if let Some(degrees) = heading
            && !(0.0..360.0).contains(&degrees)
        {
            return Err(PresenceDomainError::InvalidHeading(degrees));
        }
        Ok(Self { point, heading })
    }

    /// Returns the position.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        self.point
    }

    /// Returns the heading in degrees, when known.
    #[must_use]
    pub const fn heading(&self) -> Option<f64> {
        self.heading
    }
}

/// The single stored location of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorLocation {
    /// Reporting operator.
    pub operator_id: UserId,
    /// Last known position.
    pub point: GeoPoint,
    /// Last known heading.
    pub heading: Option<f64>,
    /// `false` once the operator signed off.
    pub is_online: bool,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl OperatorLocation {
    /// Builds the row for a fresh report.
    #[must_use]
    pub const fn reported(
        operator_id: UserId,
        fix: LocationFix,
        is_online: bool,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            operator_id,
            point: fix.point,
            heading: fix.heading,
            is_online,
            updated_at,
        }
    }
}
