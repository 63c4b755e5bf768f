//! Read models joining a request with its optional associations.

use super::ServiceRequest;
use crate::account::domain::{ProviderId, UserId};
use serde::{Deserialize, Serialize};

/// Public details of the operator working a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySummary {
    /// Operator identifier.
    pub user_id: UserId,
    /// Display name.
    pub full_name: String,
    /// Contact number.
    pub phone: Option<String>,
}

/// Public details of an operator's provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Provider identifier.
    pub provider_id: ProviderId,
    /// Display name.
    pub name: String,
}

/// A request plus associations resolved at read time.
///
/// Either association may be absent: before assignment, or when the
/// profile or provider has since been removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestView {
    /// The request.
    pub request: ServiceRequest,
    /// Assigned operator, if resolvable.
    pub operator: Option<PartySummary>,
    /// Operator's provider, if resolvable.
    pub provider: Option<ProviderSummary>,
}
