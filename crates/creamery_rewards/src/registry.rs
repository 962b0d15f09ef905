//! # Item Registry
//!
//! Multi-token item balances (ERC-1155 style). The engine only needs
//! [`ItemRegistry::grant`]; [`ItemLedger`] is the in-process store used by
//! the deployment and the tests.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{RewardError, RewardResult};
use crate::reward_table::ItemId;

/// Collaborator that credits items to accounts.
pub trait ItemRegistry: Send + Sync {
    /// Credits `quantity` of `item_id` to `account`.
    ///
    /// # Errors
    ///
    /// `Registry` if the grant is refused. A refused grant must leave the
    /// registry unchanged.
    fn grant(&self, account: Address, item_id: ItemId, quantity: u64) -> RewardResult<()>;
}

#[derive(Debug, Default)]
struct ItemBalances {
    balances: HashMap<(Address, ItemId), U256>,
    minted: HashMap<ItemId, U256>,
}

/// In-memory item balances.
#[derive(Debug, Default)]
pub struct ItemLedger {
    state: RwLock<ItemBalances>,
}

impl ItemLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `item_id` held by `account`.
    #[must_use]
    pub fn balance_of(&self, account: Address, item_id: ItemId) -> U256 {
        self.state
            .read()
            .balances
            .get(&(account, item_id))
            .copied()
            .unwrap_or_default()
    }

    /// Total quantity of `item_id` ever granted.
    #[must_use]
    pub fn total_minted(&self, item_id: ItemId) -> U256 {
        self.state
            .read()
            .minted
            .get(&item_id)
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all item balances held by `account`.
    #[must_use]
    pub fn items_held(&self, account: Address) -> U256 {
        self.state
            .read()
            .balances
            .iter()
            .filter(|((holder, _), _)| *holder == account)
            .fold(U256::ZERO, |acc, (_, qty)| acc.saturating_add(*qty))
    }
}

impl ItemRegistry for ItemLedger {
    fn grant(&self, account: Address, item_id: ItemId, quantity: u64) -> RewardResult<()> {
        if account == Address::ZERO {
            return Err(RewardError::Registry("mint to the zero address".into()));
        }
        if quantity == 0 {
            return Err(RewardError::Registry("zero quantity".into()));
        }
        let quantity = U256::from(quantity);

        let mut state = self.state.write();
        let balance = state
            .balances
            .get(&(account, item_id))
            .copied()
            .unwrap_or_default()
            .checked_add(quantity)
            .ok_or(RewardError::ArithmeticOverflow)?;
        let minted = state
            .minted
            .get(&item_id)
            .copied()
            .unwrap_or_default()
            .checked_add(quantity)
            .ok_or(RewardError::ArithmeticOverflow)?;
        state.balances.insert((account, item_id), balance);
        state.minted.insert(item_id, minted);

        debug!(account = %format!("{account:#x}"), %item_id, %quantity, "item granted");
        Ok(())
    }
}
