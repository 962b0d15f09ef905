//! # Reward Error Types
//!
//! All errors that can occur in the reward engine.

use alloy_primitives::Address;
use creamery_shared::{AccessError, Timestamp};
use creamery_token::TokenError;
use thiserror::Error;

use crate::rarity::Rarity;
use crate::reward_table::RewardType;

/// Errors that can occur in the reward engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    /// The caller lacks the role this operation requires.
    #[error(transparent)]
    Unauthorized(#[from] AccessError),

    /// The account claimed less than one cooldown ago.
    #[error("Claimed in the last 24 hours")]
    ClaimTooSoon {
        /// The claiming account.
        account: Address,
        /// Its last successful claim.
        last_claim: Timestamp,
        /// Earliest time the next claim succeeds.
        next_claim_at: Timestamp,
    },

    /// No reward range is set for this (type, rarity) pair.
    #[error("reward not configured: type {reward_type}, rarity {rarity}")]
    RewardNotConfigured {
        /// Requested reward type.
        reward_type: RewardType,
        /// Requested rarity.
        rarity: Rarity,
    },

    /// Rarity rolls were never set.
    #[error("rarity rolls not configured")]
    RarityRollsNotConfigured,

    /// Malformed thresholds, ranges or policy.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The item registry refused a grant.
    #[error("item registry rejected grant: {0}")]
    Registry(String),

    /// The token ledger refused a reward mint.
    #[error("token ledger: {0}")]
    Token(#[from] TokenError),

    /// A later step failed and earlier effects were reversed.
    #[error("transaction rolled back: {reason}")]
    TransactionRolledBack {
        /// Reason for rollback.
        reason: String,
    },

    /// Arithmetic overflow computing a reward amount.
    #[error("arithmetic overflow in reward calculation")]
    ArithmeticOverflow,
}

/// Result type for reward operations.
pub type RewardResult<T> = Result<T, RewardError>;
