//! Application services for the request lifecycle, feedback, and oversight.

mod feedback;
mod lifecycle;
mod notifications;
mod oversight;

pub use feedback::{FeedbackService, FeedbackServiceError, FeedbackServiceResult};
pub use lifecycle::{
    CreatedRequest, LifecycleDependencies, LifecyclePolicy, RequestLifecycleService,
    RequestServiceError, RequestServiceResult,
};
pub use oversight::{OversightService, OversightServiceError, ServiceStatistics};
