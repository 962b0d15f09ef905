//! # Deployment
//!
//! Wires the token ledger and the item factory together:
//!
//! 1. Deploy the ledger (`token.name`, `token.symbol`); the deployer holds
//!    the default admin role on it.
//! 2. Deploy the factory (`factory.uri_template`, ledger address); the
//!    deployer holds the default admin role on it too.
//! 3. Grant the factory `CONTRACT` on the ledger so it can mint rewards.
//! 4. Grant `ADMIN` on the factory to the configured admin and apply the
//!    initial rarity rolls, reward kinds and reward table.
//!
//! Contract addresses are derived from the deployer and a nonce, so the same
//! configuration always lands at the same addresses.

use std::sync::Arc;

use alloy_primitives::{keccak256, Address};
use creamery_rewards::{ItemFactory, ItemLedger};
use creamery_shared::{Role, RoleRegistry};
use creamery_token::MilkToken;
use tracing::info;

use crate::config::CreameryConfig;
use crate::error::DeployResult;

/// Deterministic address of the `nonce`-th contract deployed by `deployer`.
#[must_use]
pub fn contract_address(deployer: Address, nonce: u64) -> Address {
    let mut preimage = [0u8; 28];
    preimage[..20].copy_from_slice(deployer.as_slice());
    preimage[20..].copy_from_slice(&nonce.to_be_bytes());
    Address::from_slice(&keccak256(preimage)[12..])
}

/// A deployed and wired system.
#[derive(Debug)]
pub struct Deployment {
    /// Deploying account (default admin on both contracts).
    pub deployer: Address,
    /// Account holding `ADMIN` on the factory.
    pub admin: Address,
    /// Role store of the ledger.
    pub token_roles: Arc<RoleRegistry>,
    /// The Milk ledger.
    pub token: Arc<MilkToken>,
    /// Role store of the factory.
    pub factory_roles: Arc<RoleRegistry>,
    /// Item balances granted by the factory.
    pub items: Arc<ItemLedger>,
    /// The item factory.
    pub factory: Arc<ItemFactory<ItemLedger>>,
}

impl Deployment {
    /// Deploys and wires everything described by `config`.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` for bad accounts, `Reward` if the initial tables are
    /// rejected, `Access` if a role grant fails.
    pub fn deploy(config: &CreameryConfig) -> DeployResult<Self> {
        config.validate()?;
        let deployer = config.deployment.deployer()?;
        let admin = config.deployment.admin()?;
        info!(deployer = %format!("{deployer:#x}"), "deploying");

        let token_roles = Arc::new(RoleRegistry::new(deployer));
        let token = Arc::new(MilkToken::new(
            contract_address(deployer, 0),
            &config.token,
            token_roles.clone(),
        ));
        info!(
            address = %format!("{:#x}", token.address()),
            name = token.name(),
            symbol = token.symbol(),
            "token deployed"
        );

        let factory_roles = Arc::new(RoleRegistry::new(deployer));
        let items = Arc::new(ItemLedger::new());
        let factory = Arc::new(ItemFactory::with_cooldown(
            contract_address(deployer, 1),
            config.factory.uri_template.clone(),
            token.clone(),
            factory_roles.clone(),
            items.clone(),
            config.factory.cooldown_secs,
        ));
        info!(
            address = %format!("{:#x}", factory.address()),
            uri = factory.uri(),
            "factory deployed"
        );

        token_roles.grant_role(deployer, Role::contract(), factory.address())?;
        info!("factory granted CONTRACT on token");

        factory_roles.grant_role(deployer, Role::admin(), admin)?;
        config.factory.apply(&factory, admin)?;
        info!(
            admin = %format!("{admin:#x}"),
            rewards = config.factory.rewards.len(),
            "factory configured"
        );

        Ok(Self {
            deployer,
            admin,
            token_roles,
            token,
            factory_roles,
            items,
            factory,
        })
    }
}
