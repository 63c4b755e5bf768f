//! In-memory request adapters.

mod feedback;
mod notifier;
mod requests;

pub use feedback::InMemoryFeedbackRepository;
pub use notifier::RecordingNotifier;
pub use requests::InMemoryServiceRequestRepository;
