//! Identifier types for the account domain.

use crate::ids::uuid_identifier;

uuid_identifier! {
    /// Identifier of an authenticated person (requester, operator, admin, or MOP).
    UserId
}

uuid_identifier! {
    /// Identifier of a provider, the fleet an operator works for.
    ProviderId
}
