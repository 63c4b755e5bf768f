//! Tracing subscriber setup for the server binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::TryInitError};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "towline=info,tower_http=info";

/// Installs the global subscriber: `RUST_LOG` filtering and formatted
/// output on stdout.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}
