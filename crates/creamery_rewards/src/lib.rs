//! # Creamery Rewards
//!
//! **The Item Factory** - daily, rarity-tiered rewards.
//!
//! ## Modules
//!
//! - [`rarity`]: entropy -> rarity tier through ordered roll thresholds
//! - [`reward_table`]: per `(type, rarity)` ranges and candidate items
//! - [`claims`]: one claim per account per cooldown
//! - [`registry`]: the item registry collaborator and its in-memory ledger
//! - [`factory`]: the engine composing all of the above
//! - [`config`]: the `[factory]` section of the deployment file
//!
//! ## Determinism
//!
//! Same entropy + same configuration = same outcome. The engine never draws
//! randomness of its own; see [`entropy`] for how one entropy word is split
//! into independent decisions.
//!
//! ## Example
//!
//! ```rust,ignore
//! let factory = ItemFactory::new(address, "hostingsite/{id}.json", milk, roles, items);
//! factory.set_rarity_rolls(admin, RarityThresholds::new(50, 70, 80, 90, 100, 150)?)?;
//! factory.set_reward_encoded(admin, 0, Rarity::Common, &reward_data)?;
//!
//! let outcome = factory.claim(player, entropy, now)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod claims;
pub mod config;
pub mod entropy;
pub mod error;
pub mod events;
pub mod factory;
pub mod rarity;
pub mod registry;
pub mod reward_table;

pub use claims::ClaimLedger;
pub use config::{FactoryConfig, RarityRollsConfig, RewardEntryConfig, RewardKindConfig};
pub use entropy::SeededEntropy;
pub use error::{RewardError, RewardResult};
pub use events::FactoryEvent;
pub use factory::{ClaimOutcome, ItemFactory, RewardKind, RewardTypePolicy};
pub use rarity::{select_rarity, Rarity, RarityThresholds};
pub use registry::{ItemLedger, ItemRegistry};
pub use reward_table::{
    decode_reward_data, encode_reward_data, pick_item, ItemId, Pick, RewardRange, RewardTable,
    RewardType,
};
