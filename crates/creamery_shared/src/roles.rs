//! # Roles
//!
//! A role is a 32-byte identifier. The default admin role is all zeroes;
//! every other role is the keccak-256 hash of its name, so identifiers match
//! the ones a Solidity `AccessControl` contract would report.

use std::fmt;

use alloy_primitives::{keccak256, B256};

/// A role identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Role(B256);

impl Role {
    /// The root role. Holders administer every role whose admin was not changed.
    pub const DEFAULT_ADMIN: Self = Self(B256::ZERO);

    /// Derives a role from its name (`keccak256(name)`).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(keccak256(name.as_bytes()))
    }

    /// Configures rarity rolls and reward tables on the item factory.
    #[must_use]
    pub fn admin() -> Self {
        Self::from_name("ADMIN_ROLE")
    }

    /// Credits bridged deposits on the token ledger.
    #[must_use]
    pub fn depositor() -> Self {
        Self::from_name("DEPOSITOR_ROLE")
    }

    /// Game contracts allowed to mint, burn and move tokens on behalf of players.
    #[must_use]
    pub fn contract() -> Self {
        Self::from_name("CONTRACT_ROLE")
    }

    /// Free minting on the token ledger.
    #[must_use]
    pub fn master() -> Self {
        Self::from_name("MASTER_ROLE")
    }

    /// Raw identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> B256 {
        self.0
    }
}

impl From<B256> for Role {
    fn from(id: B256) -> Self {
        Self(id)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
