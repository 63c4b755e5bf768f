//! Adapter implementations for request ports.

mod feed;
pub mod memory;
mod notifier;
mod pin_hasher;
pub mod postgres;

pub use feed::BroadcastChangeFeed;
pub use notifier::{LoggingNotifier, WebhookNotifier};
pub use pin_hasher::BcryptPinHasher;
