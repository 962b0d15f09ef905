//! # Deployment Configuration
//!
//! One TOML file describes a whole deployment:
//!
//! ```toml
//! [deployment]
//! deployer = "0x00000000000000000000000000000000000000d0"
//!
//! [token]
//! name = "MilkRewardToken"
//! symbol = "MLK"
//!
//! [factory]
//! uri_template = "hostingsite/{id}.json"
//! # ... see `creamery_rewards::config`
//! ```
//!
//! Loaded once at startup and validated on load.

use std::fs;
use std::path::Path;

use alloy_primitives::Address;
use creamery_rewards::FactoryConfig;
use creamery_token::TokenConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, DeployResult};

fn default_deployer() -> String {
    format!("{:#x}", Address::repeat_byte(0xD0))
}

/// Accounts used while wiring the contracts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Account that deploys both contracts and holds the default admin role.
    #[serde(default = "default_deployer")]
    pub deployer: String,

    /// Account granted `ADMIN` on the factory. Defaults to the deployer.
    #[serde(default)]
    pub admin: Option<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            admin: None,
        }
    }
}

impl DeploymentConfig {
    /// Parsed deployer address.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` if the field is not a 20-byte hex address.
    pub fn deployer(&self) -> DeployResult<Address> {
        parse_address("deployment.deployer", &self.deployer)
    }

    /// Parsed admin address, falling back to the deployer.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` if either field is malformed.
    pub fn admin(&self) -> DeployResult<Address> {
        match &self.admin {
            Some(admin) => parse_address("deployment.admin", admin),
            None => self.deployer(),
        }
    }
}

fn parse_address(field: &'static str, value: &str) -> DeployResult<Address> {
    value.parse().map_err(|_| DeployError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

/// Complete deployment configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreameryConfig {
    /// Wiring accounts.
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Token ledger parameters.
    #[serde(default)]
    pub token: TokenConfig,

    /// Engine parameters and initial tables.
    #[serde(default)]
    pub factory: FactoryConfig,
}

impl CreameryConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise see [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> DeployResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| DeployError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// `Config` for TOML errors, `InvalidAddress` for bad accounts, `Reward`
    /// for a malformed factory section.
    pub fn from_toml_str(contents: &str) -> DeployResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| DeployError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// The first problem found.
    pub fn validate(&self) -> DeployResult<()> {
        self.deployment.deployer()?;
        self.deployment.admin()?;
        if self.token.name.is_empty() || self.token.symbol.is_empty() {
            return Err(DeployError::Config("token name and symbol must be set".into()));
        }
        self.factory.validate()?;
        Ok(())
    }
}
