//! Pricing port used when creating and completing requests.

use crate::pricing::domain::{PriceQuote, QuoteInput};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Quote failure, opaque to the lifecycle.
#[derive(Debug, Clone, Error)]
#[error("price quote failed: {0}")]
pub struct TripQuoteError(Arc<dyn std::error::Error + Send + Sync>);

impl TripQuoteError {
    /// Wraps the underlying pricing error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Prices a prospective or finished request.
#[async_trait]
pub trait TripQuoter: Send + Sync {
    /// Computes the price for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`TripQuoteError`] when pricing data is missing or the trip
    /// is rejected.
    async fn quote(&self, input: &QuoteInput) -> Result<PriceQuote, TripQuoteError>;
}
