//! # Access Control Errors

use alloy_primitives::Address;
use thiserror::Error;

use crate::roles::Role;

/// Errors raised by role checks and role administration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The account lacks a role required by the call.
    #[error("AccessControl: account {account:#x} is missing role {role}")]
    Unauthorized {
        /// The caller that was rejected.
        account: Address,
        /// The role the call requires.
        role: Role,
    },

    /// Roles can only be renounced by their holder.
    #[error("AccessControl: can only renounce roles for self")]
    RenounceForOther {
        /// The caller.
        caller: Address,
        /// The account named in the call.
        account: Address,
    },
}

/// Result type for access-control operations.
pub type AccessResult<T> = Result<T, AccessError>;
