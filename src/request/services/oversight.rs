//! Aggregate statistics for administrators and the MOP.

use crate::account::domain::{Actor, Role};
use crate::request::{
    domain::{RequestStatus, ServiceType},
    ports::{
        FeedbackRepository, FeedbackRepositoryError, RequestRepositoryError,
        ServiceRequestRepository,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Service-wide counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatistics {
    /// Every request ever created.
    pub total_requests: u64,
    /// Request count per status.
    pub by_status: BTreeMap<RequestStatus, u64>,
    /// Request count per service type.
    pub by_service_type: BTreeMap<ServiceType, u64>,
    /// Sum of final prices of completed requests.
    pub completed_revenue: Decimal,
    /// Cancelled requests.
    pub cancelled: u64,
    /// Mean stars over all ratings, two decimals; `None` without ratings.
    pub average_rating: Option<Decimal>,
    /// Number of ratings.
    pub ratings_count: u64,
}

/// Errors returned by [`OversightService`].
#[derive(Debug, Error)]
pub enum OversightServiceError {
    /// Only administrators and the MOP may read statistics.
    #[error("role {0} may not read service statistics")]
    Forbidden(Role),
    /// Request listing failed.
    #[error(transparent)]
    Requests(#[from] RequestRepositoryError),
    /// Rating listing failed.
    #[error(transparent)]
    Feedback(#[from] FeedbackRepositoryError),
}

/// Read-only aggregate reporting.
#[derive(Clone)]
pub struct OversightService<R, F>
where
    R: ServiceRequestRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    requests: Arc<R>,
    feedback: Arc<F>,
}

impl<R, F> OversightService<R, F>
where
    R: ServiceRequestRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    /// Creates the service.
    #[must_use]
    pub const fn new(requests: Arc<R>, feedback: Arc<F>) -> Self {
        Self { requests, feedback }
    }

    /// Computes service statistics.
    ///
    /// # Errors
    ///
    /// Returns [`OversightServiceError::Forbidden`] for anyone other than an
    /// administrator or the MOP.
    pub async fn service_statistics(
        &self,
        actor: &Actor,
    ) -> Result<ServiceStatistics, OversightServiceError> {
        if !actor.is_overseer() {
            return Err(OversightServiceError::Forbidden(actor.role()));
        }
        let requests = self.requests.list_all().await?;
        let ratings = self.feedback.list_ratings().await?;

        let mut by_status = BTreeMap::new();
        let mut by_service_type = BTreeMap::new();
        let mut completed_revenue = Decimal::ZERO;
        for request in &requests {
            *by_status.entry(request.status()).or_insert(0_u64) += 1;
            *by_service_type.entry(request.service_type()).or_insert(0_u64) += 1;
            if request.status() == RequestStatus::Completed
                && let Some(quote) = request.quote()
            {
                completed_revenue += quote.total;
            }
        }
        let cancelled = by_status
            .get(&RequestStatus::Cancelled)
            .copied()
            .unwrap_or_default();

        let ratings_count = u64::try_from(ratings.len()).unwrap_or(u64::MAX);
        let star_total: Decimal = ratings
            .iter()
            .map(|rating| Decimal::from(rating.stars.value()))
            .sum();
        let average_rating = (ratings_count > 0)
            .then(|| (star_total / Decimal::from(ratings_count)).round_dp(2));

        Ok(ServiceStatistics {
            total_requests: u64::try_from(requests.len()).unwrap_or(u64::MAX),
            by_status,
            by_service_type,
            completed_revenue,
            cancelled,
            average_rating,
            ratings_count,
        })
    }
}
