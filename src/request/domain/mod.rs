//! Domain model for service requests.

mod error;
mod event;
mod feedback;
mod ids;
mod pin;
mod request;
mod service;
mod status;
mod view;

pub use error::{
    ParseRequestStatusError, ParseServiceTypeError, ParseTowTypeError, RequestDomainError,
};
pub use event::RequestEvent;
pub use feedback::{
    MAX_COMMENT_CHARS, MAX_MESSAGE_CHARS, MessageBody, Rating, RequestMessage, Stars,
};
pub use ids::{EventId, MessageId, RatingId, RequestId};
pub use pin::{
    PIN_LENGTH, PinAttempt, PinHash, PinPolicy, PinRecord, PinReservation, RequestPin,
};
pub use request::{
    Cancellation, CancellationReason, MAX_NOTES_CHARS, MAX_REASON_CHARS, PersistedRequestData,
    RequestDraft, ServiceRequest, Timeline,
};
pub use service::{MAX_FUEL_GALLONS, Place, ServiceDetails, ServiceType, TowType};
pub use status::RequestStatus;
pub use view::{PartySummary, ProviderSummary, RequestView};
