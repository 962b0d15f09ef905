//! # Creamery Shared Types
//!
//! Leaf crate used by the token ledger and the reward engine.
//!
//! ## Contents
//!
//! - [`Role`] identifiers, hashed the same way Solidity `AccessControl` hashes them
//! - [`AccessControl`], the guard every privileged mutation consults
//! - [`RoleRegistry`], the in-process role store implementing that guard
//! - Protocol constants (claim cooldown, token decimals)
//!
//! Accounts are plain [`Address`] values. There is no account object: every
//! component keys its own state by address.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod access;
pub mod constants;
pub mod error;
pub mod roles;

pub use access::{AccessControl, RoleRegistry};
pub use constants::{token_unit, CLAIM_COOLDOWN_SECS, SECONDS_PER_DAY, TOKEN_DECIMALS};
pub use error::{AccessError, AccessResult};
pub use roles::Role;

pub use alloy_primitives::{Address, B256, U256};

/// Seconds since the Unix epoch, supplied by the execution environment.
pub type Timestamp = u64;
