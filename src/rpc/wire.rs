//! JSON bodies exchanged over `POST /rpc/<name>`.
//!
//! The server deserializes these and the HTTP client serializes them, so
//! both directions derive both traits.

use crate::account::domain::{ProviderId, Role, UserId};
use crate::distance::domain::{DistanceError, DistanceEstimate, GeoPoint};
use crate::pricing::domain::{NewPricingRule, PricingRuleId};
use crate::request::domain::{
    Place, RequestDraft, RequestId, ServiceDetails, ServiceType, TowType,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw coordinate pair with an optional address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LocationInput {
    fn into_place(self) -> Result<Place, DistanceError> {
        let place = Place::new(GeoPoint::new(self.lat, self.lng)?);
        Ok(match self.address {
            Some(address) => place.with_address(address),
            None => place,
        })
    }
}

impl From<&Place> for LocationInput {
    fn from(place: &Place) -> Self {
        Self {
            lat: place.point.lat(),
            lng: place.point.lng(),
            address: place.address.clone(),
        }
    }
}

/// Body of `create_service_request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceRequestBody {
    /// Where the vehicle is.
    pub pickup: LocationInput,
    /// Tow destination.
    #[serde(default)]
    pub dropoff: Option<LocationInput>,
    /// Free-text incident description.
    #[serde(default)]
    pub incident_type: Option<String>,
    /// Truck class for tows.
    #[serde(default)]
    pub tow_type: Option<TowType>,
    /// Requested service.
    pub service_type: ServiceType,
    /// Service-specific details.
    #[serde(default)]
    pub service_details: ServiceDetails,
    /// Instructions for the operator.
    #[serde(default)]
    pub notes: Option<String>,
    /// Photo of the scene.
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl CreateServiceRequestBody {
    /// Converts the body into a draft.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidCoordinate`] for malformed points.
    pub fn into_draft(self) -> Result<RequestDraft, DistanceError> {
        Ok(RequestDraft {
            service_type: self.service_type,
            tow_type: self.tow_type,
            details: self.service_details,
            pickup: self.pickup.into_place()?,
            dropoff: self.dropoff.map(LocationInput::into_place).transpose()?,
            incident_type: self.incident_type,
            notes: self.notes,
            photo_url: self.photo_url,
        })
    }
}

impl From<&RequestDraft> for CreateServiceRequestBody {
    fn from(draft: &RequestDraft) -> Self {
        Self {
            pickup: LocationInput::from(&draft.pickup),
            dropoff: draft.dropoff.as_ref().map(LocationInput::from),
            incident_type: draft.incident_type.clone(),
            tow_type: draft.tow_type,
            service_type: draft.service_type,
            service_details: draft.details,
            notes: draft.notes.clone(),
            photo_url: draft.photo_url.clone(),
        }
    }
}

/// Result of `create_service_request`. The PIN appears here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRequestResponse {
    /// Always `true`.
    pub success: bool,
    /// New request.
    pub request_id: RequestId,
    /// Four-digit arrival PIN.
    pub pin: String,
}

/// Body naming a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestIdBody {
    /// Target request.
    pub request_id: RequestId,
}

/// Body of `verify_request_pin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPinBody {
    /// Target request.
    pub request_id: RequestId,
    /// PIN read out by the customer.
    pub pin: String,
}

/// Result of `verify_request_pin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPinResponse {
    /// Whether the PIN matched.
    pub valid: bool,
}

/// Body of `cancel_service_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBody {
    /// Target request.
    pub request_id: RequestId,
    /// Why the request is being cancelled.
    pub reason: String,
}

/// Acknowledgement for commands without a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true`; failures use [`ErrorBody`].
    pub success: bool,
}

impl SuccessResponse {
    /// The positive acknowledgement.
    pub const OK: Self = Self { success: true };
}

/// Body of `rate_service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateServiceBody {
    /// Rated request.
    pub request_id: RequestId,
    /// One to five.
    pub stars: u8,
    /// Optional remark.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Body of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageBody {
    /// Conversation's request.
    pub request_id: RequestId,
    /// Message text.
    pub message: String,
}

/// Body of `set_active_pricing_rule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetActivePricingRuleBody {
    /// Rule to activate.
    pub rule_id: PricingRuleId,
}

/// Body of `create_pricing_rule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePricingRuleBody {
    /// Display name.
    pub name: String,
    /// Flat dispatch fee.
    pub base_exit_fee: Decimal,
    /// Kilometers covered by the fee.
    pub included_km: Decimal,
    /// Per-kilometer rate for light tows.
    pub price_per_km_light: Decimal,
    /// Per-kilometer rate for heavy tows.
    pub price_per_km_heavy: Decimal,
}

impl From<CreatePricingRuleBody> for NewPricingRule {
    fn from(body: CreatePricingRuleBody) -> Self {
        Self {
            name: body.name,
            base_exit_fee: body.base_exit_fee,
            included_km: body.included_km,
            price_per_km_light: body.price_per_km_light,
            price_per_km_heavy: body.price_per_km_heavy,
        }
    }
}

/// Body of `upsert_service_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertServiceRateBody {
    /// Flat-priced service.
    pub service_type: ServiceType,
    /// Base price.
    pub base_price: Decimal,
    /// Per-unit surcharge.
    pub extra_fee: Decimal,
}

/// Body of `admin_update_user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRoleBody {
    /// Profile being changed.
    pub user_id: UserId,
    /// Role to assign.
    pub new_role: Role,
    /// Provider for operators.
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
}

/// Body of `register_profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProfileBody {
    /// Display name.
    pub full_name: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body of `register_provider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProviderBody {
    /// Fleet name.
    pub name: String,
}

/// Body of `upsert_operator_location`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpsertLocationBody {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Compass heading.
    #[serde(default)]
    pub heading: Option<f64>,
    /// Whether the operator is taking work.
    pub is_online: bool,
}

/// Body of `get_operator_presence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorPresenceBody {
    /// Operator to look up.
    pub operator_id: UserId,
}

/// Body of `estimate_distance` and `estimate_eta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateBody {
    /// Start point.
    pub origin: GeoPoint,
    /// End point.
    pub destination: GeoPoint,
}

/// Result of `estimate_distance` and `estimate_eta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateResponse {
    /// Road distance in kilometers.
    pub distance_km: f64,
    /// Driving time in minutes.
    pub duration_minutes: f64,
    /// Whether the figures come from the geometric fallback.
    pub is_fallback: bool,
}

impl From<DistanceEstimate> for EstimateResponse {
    fn from(estimate: DistanceEstimate) -> Self {
        Self {
            distance_km: estimate.distance_km,
            duration_minutes: estimate.duration_minutes,
            is_fallback: estimate.is_fallback,
        }
    }
}

/// Error payload: `{success: false, error: {code, message}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// What went wrong.
    pub error: ErrorDetail,
}

/// Stable code plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code such as `request_no_longer_available`.
    pub code: String,
    /// Explanation for people.
    pub message: String,
}
