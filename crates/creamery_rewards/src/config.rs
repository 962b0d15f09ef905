//! # Factory Configuration
//!
//! The `[factory]` section of the deployment file:
//!
//! ```toml
//! [factory]
//! uri_template = "hostingsite/{id}.json"
//! cooldown_secs = 86400
//!
//! [factory.reward_type_policy]
//! mode = "entropy_derived"
//! types = 2
//!
//! [factory.rarity_rolls]
//! common = 50
//! uncommon = 70
//! rare = 80
//! epic = 90
//! legendary = 100
//! max_roll = 150
//!
//! [[factory.reward_kinds]]
//! reward_type = 0
//! kind = "token"
//!
//! [[factory.rewards]]
//! reward_type = 0
//! rarity = "common"
//! min = 50
//! max = 75
//! ids = [1]
//! ```

use alloy_primitives::{Address, U256};
use creamery_shared::CLAIM_COOLDOWN_SECS;
use serde::{Deserialize, Serialize};

use crate::error::{RewardError, RewardResult};
use crate::factory::{ItemFactory, RewardKind, RewardTypePolicy};
use crate::rarity::{Rarity, RarityThresholds};
use crate::registry::ItemRegistry;
use crate::reward_table::{RewardRange, RewardType};

fn default_uri_template() -> String {
    "hostingsite/{id}.json".to_string()
}

fn default_cooldown_secs() -> u64 {
    CLAIM_COOLDOWN_SECS
}

/// Raw rarity thresholds, validated by [`RarityRollsConfig::thresholds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityRollsConfig {
    /// Common upper bound.
    pub common: u64,
    /// Uncommon upper bound.
    pub uncommon: u64,
    /// Rare upper bound.
    pub rare: u64,
    /// Epic upper bound.
    pub epic: u64,
    /// Legendary threshold.
    pub legendary: u64,
    /// Roll modulus.
    pub max_roll: u64,
}

impl RarityRollsConfig {
    /// Validated thresholds.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the ordering invariant does not hold.
    pub fn thresholds(&self) -> RewardResult<RarityThresholds> {
        RarityThresholds::new(
            self.common,
            self.uncommon,
            self.rare,
            self.epic,
            self.legendary,
            self.max_roll,
        )
    }
}

/// Payout kind of one reward type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardKindConfig {
    /// Reward type.
    pub reward_type: RewardType,
    /// Its payout kind.
    pub kind: RewardKind,
}

/// One reward table cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntryConfig {
    /// Reward type.
    pub reward_type: RewardType,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Lower bound (inclusive).
    pub min: u64,
    /// Upper bound (inclusive).
    pub max: u64,
    /// Candidate item ids.
    pub ids: Vec<u64>,
}

impl RewardEntryConfig {
    /// Validated range.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `min > max` or `ids` is empty.
    pub fn range(&self) -> RewardResult<RewardRange> {
        RewardRange::new(
            U256::from(self.min),
            U256::from(self.max),
            self.ids.iter().copied().map(U256::from).collect(),
        )
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Metadata URI template.
    #[serde(default = "default_uri_template")]
    pub uri_template: String,

    /// Seconds between two claims of one account.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// How claims pick their reward type.
    #[serde(default)]
    pub reward_type_policy: RewardTypePolicy,

    /// Initial thresholds. Claims fail until these are set.
    #[serde(default)]
    pub rarity_rolls: Option<RarityRollsConfig>,

    /// Reward types that also mint tokens.
    #[serde(default)]
    pub reward_kinds: Vec<RewardKindConfig>,

    /// Initial reward table.
    #[serde(default)]
    pub rewards: Vec<RewardEntryConfig>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            uri_template: default_uri_template(),
            cooldown_secs: default_cooldown_secs(),
            reward_type_policy: RewardTypePolicy::default(),
            rarity_rolls: None,
            reward_kinds: Vec::new(),
            rewards: Vec::new(),
        }
    }
}

impl FactoryConfig {
    /// Parses a standalone `[factory]` table and validates it.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the text is not valid TOML or a section is malformed.
    pub fn from_toml_str(contents: &str) -> RewardResult<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| RewardError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section without touching an engine.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for the first malformed section found.
    pub fn validate(&self) -> RewardResult<()> {
        if self.cooldown_secs == 0 {
            return Err(RewardError::InvalidConfiguration(
                "cooldown_secs must be greater than zero".into(),
            ));
        }
        self.reward_type_policy.validate()?;
        if let Some(rolls) = &self.rarity_rolls {
            rolls.thresholds()?;
        }
        for entry in &self.rewards {
            entry.range()?;
        }
        Ok(())
    }

    /// Applies thresholds, policy, kinds and rewards to `factory` as `admin`.
    ///
    /// Everything is validated before the first write.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration`, or `Unauthorized` if `admin` lacks `ADMIN`.
    pub fn apply<R: ItemRegistry>(&self, factory: &ItemFactory<R>, admin: Address) -> RewardResult<()> {
        self.validate()?;

        factory.set_reward_type_policy(admin, self.reward_type_policy)?;
        if let Some(rolls) = &self.rarity_rolls {
            factory.set_rarity_rolls(admin, rolls.thresholds()?)?;
        }
        for entry in &self.reward_kinds {
            factory.set_reward_kind(admin, entry.reward_type, entry.kind)?;
        }
        for entry in &self.rewards {
            factory.set_reward(admin, entry.reward_type, entry.rarity, entry.range()?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        uri_template = "oursite/{id}.json"

        [reward_type_policy]
        mode = "fixed"
        reward_type = 1

        [rarity_rolls]
        common = 50
        uncommon = 70
        rare = 80
        epic = 90
        legendary = 100
        max_roll = 150

        [[reward_kinds]]
        reward_type = 0
        kind = "token"

        [[rewards]]
        reward_type = 1
        rarity = "rare"
        min = 7
        max = 9
        ids = [1, 2, 3]
    "#;

    #[test]
    fn test_parse_sample() {
        let config: FactoryConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.uri_template, "oursite/{id}.json");
        assert_eq!(config.cooldown_secs, 86_400);
        assert_eq!(config.reward_type_policy, RewardTypePolicy::Fixed { reward_type: 1 });
        assert_eq!(config.reward_kinds[0].kind, RewardKind::Token);
        assert_eq!(config.rewards[0].rarity, Rarity::Rare);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str_validates() {
        assert!(FactoryConfig::from_toml_str(SAMPLE).is_ok());
        let err = FactoryConfig::from_toml_str("cooldown_secs = 0").unwrap_err();
        assert!(matches!(err, RewardError::InvalidConfiguration(_)));
        assert!(FactoryConfig::from_toml_str("rewards = 3").is_err());
    }

    #[test]
    fn test_defaults() {
        let config: FactoryConfig = toml::from_str("").unwrap();
        assert_eq!(config, FactoryConfig::default());
        assert_eq!(config.reward_type_policy, RewardTypePolicy::EntropyDerived { types: 2 });
        assert!(config.rarity_rolls.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_sections() {
        let mut config: FactoryConfig = toml::from_str(SAMPLE).unwrap();
        config.rewards[0].min = 10;
        assert!(config.validate().is_err());

        let mut config: FactoryConfig = toml::from_str(SAMPLE).unwrap();
        config.rarity_rolls = Some(RarityRollsConfig {
            common: 80,
            uncommon: 70,
            rare: 80,
            epic: 90,
            legendary: 100,
            max_roll: 150,
        });
        assert!(config.validate().is_err());

        let config = FactoryConfig {
            cooldown_secs: 0,
            ..FactoryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
