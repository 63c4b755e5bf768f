//! Serves the dispatch RPC surface over HTTP.
//!
//! Usage:
//!
//! ```text
//! JWT_SECRET=... towline
//! ```
//!
//! Configuration comes from the environment (and a `.env` file when
//! present). Without `DATABASE_URL` every store is in memory, which suits
//! local development only.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use towline::config::{ConfigError, DispatchConfig};
use towline::dispatch::{Dispatch, DispatchBuildError};
use towline::rpc::{RpcLimits, RpcState, SessionKeys, router};
use towline::telemetry;
use tracing::{info, warn};

/// Errors that stop the server.
#[derive(Debug, Error)]
enum ServerError {
    #[error("logging setup failed: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to wire services: {0}")]
    Build(#[from] DispatchBuildError),
    #[error("failed to bind or serve: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    telemetry::init()?;
    let config = DispatchConfig::from_env()?;
    if config.database_url.is_none() {
        warn!("DATABASE_URL is unset; using in-memory stores");
    }

    let dispatch = Arc::new(Dispatch::from_config(&config)?);
    let keys = SessionKeys::from_secret(config.jwt_secret.as_bytes());
    let app = router(RpcState::new(dispatch, keys), RpcLimits::from_config(&config));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "dispatch RPC listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("dispatch RPC stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
