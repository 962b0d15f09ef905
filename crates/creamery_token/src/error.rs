//! # Token Error Types
//!
//! All errors that can occur in the token ledger.

use alloy_primitives::{Address, U256};
use creamery_shared::AccessError;
use thiserror::Error;

/// Errors that can occur in the token ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The caller lacks the role this operation requires.
    #[error(transparent)]
    Unauthorized(#[from] AccessError),

    /// Burn or transfer exceeds the account's balance.
    #[error("insufficient balance: account {account:#x} holds {balance}, needs {required}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// Its balance at the time of the call.
        balance: U256,
        /// The amount requested.
        required: U256,
    },

    /// Minting would push total supply past the canonical max supply.
    #[error("supply cap exceeded: total {total_supply} + {amount} > max {max_supply}")]
    SupplyCapExceeded {
        /// Total supply before the mint.
        total_supply: U256,
        /// Amount requested.
        amount: U256,
        /// Configured cap.
        max_supply: U256,
    },

    /// Arithmetic overflow in balance accounting.
    #[error("arithmetic overflow in balance accounting")]
    ArithmeticOverflow,

    /// Tokens cannot be minted or sent to the zero address.
    #[error("zero address is not a valid recipient")]
    ZeroAddress,

    /// Bridge deposit payload is not an ABI-encoded `uint256`.
    #[error("invalid deposit data: {0}")]
    InvalidDepositData(String),
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
