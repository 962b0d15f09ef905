//! # Protocol Constants
//!
//! Values shared by the token ledger and the reward engine.

use alloy_primitives::U256;

/// One day in seconds.
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Minimum time between two successful claims by the same account.
pub const CLAIM_COOLDOWN_SECS: u64 = SECONDS_PER_DAY;

/// Decimals of the reward token (same as ether).
pub const TOKEN_DECIMALS: u8 = 18;

/// One whole token expressed in base units (`10^decimals`).
#[must_use]
pub fn token_unit(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}
