//! # Token Configuration
//!
//! The `[token]` section of the deployment file.

use alloy_primitives::U256;
use creamery_shared::{token_unit, TOKEN_DECIMALS};
use serde::{Deserialize, Serialize};

/// Construction parameters of the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token name (e.g. `"MilkRewardToken"`).
    pub name: String,
    /// Token symbol (e.g. `"MLK"`).
    pub symbol: String,
    /// Canonical supply held on the root chain, in whole tokens.
    /// `None` leaves the cap at the integer width.
    #[serde(default)]
    pub max_supply_tokens: Option<u64>,
}

impl TokenConfig {
    /// Creates a config with no supply cap.
    #[must_use]
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            max_supply_tokens: None,
        }
    }

    /// Supply cap in base units.
    #[must_use]
    pub fn max_supply(&self) -> U256 {
        self.max_supply_tokens.map_or(U256::MAX, |tokens| {
            U256::from(tokens).saturating_mul(token_unit(TOKEN_DECIMALS))
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new("MilkRewardToken", "MLK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncapped_by_default() {
        assert_eq!(TokenConfig::default().max_supply(), U256::MAX);
    }

    #[test]
    fn test_cap_in_base_units() {
        let config: TokenConfig = toml::from_str(
            r#"
            name = "MilkReward"
            symbol = "MLK"
            max_supply_tokens = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.symbol, "MLK");
        assert_eq!(
            config.max_supply(),
            U256::from(1000u64) * token_unit(TOKEN_DECIMALS)
        );
    }
}
