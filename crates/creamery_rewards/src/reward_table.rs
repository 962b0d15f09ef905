//! # Reward Table
//!
//! Per `(reward type, rarity)` value ranges and candidate item ids.
//!
//! A claim picks a value uniformly-ish inside the range, then uses that value
//! to index the candidate list:
//!
//! ```text
//! amount = min + (entropy2 mod (max - min + 1))
//! item   = ids[amount mod ids.len()]
//! ```

use std::collections::HashMap;

use alloy_primitives::U256;
use alloy_sol_types::{sol_data, SolType};

use crate::error::{RewardError, RewardResult};
use crate::rarity::Rarity;

/// Reward category index (the first key of the table).
pub type RewardType = u32;

/// Item identifier in the item registry.
pub type ItemId = U256;

/// `(uint256 min, uint256 max, uint256[] ids)`, as `abi.encode` lays it out.
type RewardData = (
    sol_data::Uint<256>,
    sol_data::Uint<256>,
    sol_data::Array<sol_data::Uint<256>>,
);

/// Value range and candidate items for one table cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardRange {
    min: U256,
    max: U256,
    ids: Vec<ItemId>,
}

impl RewardRange {
    /// Validates and builds a range.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `min > max` or `ids` is empty.
    pub fn new(min: U256, max: U256, ids: Vec<ItemId>) -> RewardResult<Self> {
        if min > max {
            return Err(RewardError::InvalidConfiguration(format!(
                "reward min {min} exceeds max {max}"
            )));
        }
        if ids.is_empty() {
            return Err(RewardError::InvalidConfiguration(
                "reward range has no candidate ids".into(),
            ));
        }
        Ok(Self { min, max, ids })
    }

    /// Lower bound (inclusive).
    #[inline]
    #[must_use]
    pub const fn min(&self) -> U256 {
        self.min
    }

    /// Upper bound (inclusive).
    #[inline]
    #[must_use]
    pub const fn max(&self) -> U256 {
        self.max
    }

    /// Candidate item ids, in configured order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }
}

/// Result of [`pick_item`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    /// Chosen item.
    pub item_id: ItemId,
    /// Chosen value in `[min, max]`.
    pub amount: U256,
}

/// Picks a value and an item from `range`. Deterministic in `entropy`.
#[must_use]
pub fn pick_item(range: &RewardRange, entropy: U256) -> Pick {
    let amount = match (range.max - range.min).checked_add(U256::from(1u64)) {
        Some(width) => range.min + entropy % width,
        // Full 2^256 range: every word is already in bounds
        None => entropy,
    };
    let index = (amount % U256::from(range.ids.len())).to::<usize>();
    Pick {
        item_id: range.ids[index],
        amount,
    }
}

/// Decodes an ABI-encoded `(uint256 min, uint256 max, uint256[] ids)` tuple.
///
/// # Errors
///
/// `InvalidConfiguration` if the bytes do not decode or the range is invalid.
pub fn decode_reward_data(data: &[u8]) -> RewardResult<RewardRange> {
    let (min, max, ids) = RewardData::abi_decode_params(data, true)
        .map_err(|e| RewardError::InvalidConfiguration(format!("reward data: {e}")))?;
    RewardRange::new(min, max, ids)
}

/// Encodes a range the way [`decode_reward_data`] expects it.
#[must_use]
pub fn encode_reward_data(range: &RewardRange) -> Vec<u8> {
    RewardData::abi_encode_params(&(range.min, range.max, range.ids.clone()))
}

/// All configured cells.
#[derive(Clone, Debug, Default)]
pub struct RewardTable {
    cells: HashMap<(RewardType, Rarity), RewardRange>,
}

impl RewardTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell, returning the range it replaced.
    pub fn set(&mut self, reward_type: RewardType, rarity: Rarity, range: RewardRange) -> Option<RewardRange> {
        self.cells.insert((reward_type, rarity), range)
    }

    /// Looks up a cell.
    ///
    /// # Errors
    ///
    /// `RewardNotConfigured` if the cell was never set.
    pub fn lookup(&self, reward_type: RewardType, rarity: Rarity) -> RewardResult<&RewardRange> {
        self.cells
            .get(&(reward_type, rarity))
            .ok_or(RewardError::RewardNotConfigured { reward_type, rarity })
    }

    /// Number of configured cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
