//! # Deployment Error Types

use std::path::PathBuf;

use creamery_rewards::RewardError;
use creamery_shared::AccessError;
use creamery_token::TokenError;
use thiserror::Error;

/// Errors that can occur while loading a configuration or deploying.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has the wrong shape.
    #[error("invalid config: {0}")]
    Config(String),

    /// An address field does not parse.
    #[error("invalid address for `{field}`: {value}")]
    InvalidAddress {
        /// Config field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// A role grant during wiring failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The token ledger refused an operation.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The engine refused its initial configuration.
    #[error(transparent)]
    Reward(#[from] RewardError),
}

/// Result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;
