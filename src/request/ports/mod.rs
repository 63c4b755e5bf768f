//! Port contracts for request persistence and side effects.

mod feed;
mod feedback;
mod notifier;
mod pin;
mod quoter;
mod repository;

pub use feed::{ChangeKind, ChangePublisher, RequestChange};
pub use feedback::{FeedbackRepository, FeedbackRepositoryError, FeedbackRepositoryResult};
pub use notifier::{NotifierError, PushNotification, PushNotifier};
pub use pin::{PinHashError, PinHasher};
pub use quoter::{TripQuoteError, TripQuoter};
pub use repository::{
    RequestRepositoryError, RequestRepositoryResult, ServiceRequestRepository, TransitionOutcome,
};
