//! # Rarity Selector
//!
//! Maps an entropy word to a rarity tier.
//!
//! ## Algorithm
//!
//! ```text
//! roll = entropy mod max_roll
//!
//!   0        common    uncommon    rare      epic                max_roll
//!   |--------|---------|-----------|---------|-------------------|
//!    Common   Uncommon  Rare        Epic      Legendary
//! ```
//!
//! Lower bounds are inclusive, upper bounds exclusive: the tier is the first
//! one whose threshold is strictly greater than the roll. Rolls at or past
//! the `legendary` threshold fall back to Legendary, so the five tiers cover
//! `[0, max_roll)` with no gaps and no overlaps.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{RewardError, RewardResult};

/// Rarity tier, ordered by increasing scarcity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Rarity {
    /// Most frequent tier.
    Common = 0,
    /// Second tier.
    Uncommon = 1,
    /// Third tier.
    Rare = 2,
    /// Fourth tier.
    Epic = 3,
    /// Scarcest tier.
    Legendary = 4,
}

impl Rarity {
    /// All tiers, in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    /// Converts from the on-chain index (0 = common .. 4 = legendary).
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Common),
            1 => Some(Self::Uncommon),
            2 => Some(Self::Rare),
            3 => Some(Self::Epic),
            4 => Some(Self::Legendary),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated roll thresholds.
///
/// Invariant: `common < uncommon < rare < epic < legendary <= max_roll`.
/// The only constructor is [`RarityThresholds::new`], so a value of this
/// type always satisfies it and `max_roll` is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RarityThresholds {
    common: u64,
    uncommon: u64,
    rare: u64,
    epic: u64,
    legendary: u64,
    max_roll: u64,
}

impl RarityThresholds {
    /// Validates and builds a threshold table.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the thresholds are not strictly increasing
    /// or `legendary` exceeds `max_roll`. A zero `common` leaves the common
    /// tier empty.
    pub fn new(
        common: u64,
        uncommon: u64,
        rare: u64,
        epic: u64,
        legendary: u64,
        max_roll: u64,
    ) -> RewardResult<Self> {
        let ordered = [common, uncommon, rare, epic, legendary];
        if ordered.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(RewardError::InvalidConfiguration(format!(
                "rarity rolls must be strictly increasing, got {ordered:?}"
            )));
        }
        if legendary > max_roll {
            return Err(RewardError::InvalidConfiguration(format!(
                "legendary roll {legendary} exceeds max roll {max_roll}"
            )));
        }
        Ok(Self {
            common,
            uncommon,
            rare,
            epic,
            legendary,
            max_roll,
        })
    }

    /// Upper bound (exclusive) of the Common tier.
    #[must_use]
    pub const fn common(&self) -> u64 {
        self.common
    }

    /// Upper bound (exclusive) of the Uncommon tier.
    #[must_use]
    pub const fn uncommon(&self) -> u64 {
        self.uncommon
    }

    /// Upper bound (exclusive) of the Rare tier.
    #[must_use]
    pub const fn rare(&self) -> u64 {
        self.rare
    }

    /// Upper bound (exclusive) of the Epic tier.
    #[must_use]
    pub const fn epic(&self) -> u64 {
        self.epic
    }

    /// Legendary threshold. Rolls at or above it stay Legendary.
    #[must_use]
    pub const fn legendary(&self) -> u64 {
        self.legendary
    }

    /// Modulus applied to entropy.
    #[must_use]
    pub const fn max_roll(&self) -> u64 {
        self.max_roll
    }

    /// Reduces entropy to a roll in `[0, max_roll)`.
    #[must_use]
    pub fn roll(&self, entropy: U256) -> u64 {
        // The remainder is below max_roll, which is a u64.
        (entropy % U256::from(self.max_roll)).to::<u64>()
    }

    /// Tier for an already reduced roll.
    #[must_use]
    pub const fn tier_for_roll(&self, roll: u64) -> Rarity {
        if roll < self.common {
            Rarity::Common
        } else if roll < self.uncommon {
            Rarity::Uncommon
        } else if roll < self.rare {
            Rarity::Rare
        } else if roll < self.epic {
            Rarity::Epic
        } else {
            Rarity::Legendary
        }
    }
}

/// Selects the rarity tier for `entropy`. Pure.
#[must_use]
pub fn select_rarity(entropy: U256, thresholds: &RarityThresholds) -> Rarity {
    thresholds.tier_for_roll(thresholds.roll(entropy))
}
