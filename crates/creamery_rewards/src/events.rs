//! # Factory Events
//!
//! Emitted by the engine after each successful mutation, oldest first.

use alloy_primitives::{Address, U256};
use creamery_shared::Timestamp;

use crate::rarity::{Rarity, RarityThresholds};
use crate::reward_table::{ItemId, RewardType};

/// An engine state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactoryEvent {
    /// Rarity thresholds replaced.
    RarityRollsUpdated {
        /// Admin that set them.
        caller: Address,
        /// New thresholds.
        thresholds: RarityThresholds,
    },
    /// A reward table cell replaced.
    RewardUpdated {
        /// Admin that set it.
        caller: Address,
        /// Reward type of the cell.
        reward_type: RewardType,
        /// Rarity of the cell.
        rarity: Rarity,
    },
    /// A daily claim succeeded.
    DailyClaim {
        /// Claiming account.
        account: Address,
        /// Reward type drawn.
        reward_type: RewardType,
        /// Rarity drawn.
        rarity: Rarity,
        /// Item granted.
        item_id: ItemId,
        /// Value drawn from the range.
        amount: U256,
        /// Claim time.
        claimed_at: Timestamp,
    },
}
