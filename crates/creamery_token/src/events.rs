//! # Ledger Events
//!
//! Emitted on every successful mutation, in order. A bridge relayer watches
//! `Withdrawn` to release tokens on the root chain.

use alloy_primitives::{Address, U256};

/// A ledger state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Balance moved. `from` is zero for mints, `to` is zero for burns.
    Transfer {
        /// Debited account (zero when minted).
        from: Address,
        /// Credited account (zero when burned).
        to: Address,
        /// Amount moved.
        amount: U256,
    },
    /// A bridged deposit was credited.
    Deposited {
        /// Credited account.
        account: Address,
        /// Amount credited.
        amount: U256,
    },
    /// Tokens were burned for release on the root chain.
    Withdrawn {
        /// Account whose tokens were burned.
        account: Address,
        /// Amount burned.
        amount: U256,
    },
}
