//! Error types for account validation and parsing.

use super::Role;
use thiserror::Error;

/// Errors returned while constructing account values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountDomainError {
    /// The profile name is empty after trimming.
    #[error("full name must not be empty")]
    EmptyFullName,

    /// The provider name is empty after trimming.
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// An operator profile was given without a provider.
    #[error("role operator requires a provider")]
    MissingProvider,

    /// A non-operator profile was given a provider.
    #[error("role {role} cannot be attached to a provider")]
    UnexpectedProvider {
        /// Role that was requested.
        role: Role,
    },
}

/// Error returned while parsing roles from persistence or wire input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
