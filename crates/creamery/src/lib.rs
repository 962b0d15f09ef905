//! # Creamery
//!
//! Deployment wiring for the Milk token and the item factory.
//!
//! ```rust,ignore
//! let config = CreameryConfig::load("data/creamery.toml")?;
//! let deployment = Deployment::deploy(&config)?;
//! let outcome = deployment.factory.claim(player, entropy, now)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod deploy;
pub mod error;

pub use config::{CreameryConfig, DeploymentConfig};
pub use deploy::{contract_address, Deployment};
pub use error::{DeployError, DeployResult};
