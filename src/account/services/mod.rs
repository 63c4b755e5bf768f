//! Application services for account administration.

mod admin;

pub use admin::{
    AccountService, AccountServiceError, AccountServiceResult, RegisterProfileRequest,
    UpdateUserRoleRequest,
};
