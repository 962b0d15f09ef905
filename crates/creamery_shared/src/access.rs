//! # Access Control
//!
//! Role-based permission checks, injected into each contract as a
//! collaborator instead of being inherited.
//!
//! ## Role administration
//!
//! Every role has an admin role. Only holders of a role's admin role may
//! grant or revoke it. Unless changed with [`RoleRegistry::set_role_admin`],
//! the admin of every role is [`Role::DEFAULT_ADMIN`], which the deployer
//! receives at construction.

use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{AccessError, AccessResult};
use crate::roles::Role;

/// Guard consulted before every privileged mutation.
pub trait AccessControl: Send + Sync {
    /// Returns true if `account` holds `role`.
    fn has_role(&self, role: Role, account: Address) -> bool;

    /// Fails with [`AccessError::Unauthorized`] if `account` lacks `role`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` naming the account and the missing role.
    fn check_role(&self, role: Role, account: Address) -> AccessResult<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            warn!(account = %format!("{account:#x}"), role = %role, "missing role");
            Err(AccessError::Unauthorized { account, role })
        }
    }
}

#[derive(Debug, Default)]
struct RoleTable {
    members: HashMap<Role, HashSet<Address>>,
    admins: HashMap<Role, Role>,
}

impl RoleTable {
    fn admin_of(&self, role: Role) -> Role {
        self.admins.get(&role).copied().unwrap_or(Role::DEFAULT_ADMIN)
    }

    fn holds(&self, role: Role, account: Address) -> bool {
        self.members
            .get(&role)
            .is_some_and(|members| members.contains(&account))
    }

    fn require(&self, role: Role, account: Address) -> AccessResult<()> {
        if self.holds(role, account) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized { account, role })
        }
    }
}

/// In-process role store.
///
/// `Send + Sync`; share it behind an `Arc` between the contract that
/// checks roles and whoever administers them.
#[derive(Debug)]
pub struct RoleRegistry {
    table: RwLock<RoleTable>,
}

impl RoleRegistry {
    /// Creates a registry where `default_admin` holds [`Role::DEFAULT_ADMIN`].
    #[must_use]
    pub fn new(default_admin: Address) -> Self {
        let mut table = RoleTable::default();
        table
            .members
            .entry(Role::DEFAULT_ADMIN)
            .or_default()
            .insert(default_admin);
        Self {
            table: RwLock::new(table),
        }
    }

    /// Returns the admin role of `role`.
    #[must_use]
    pub fn role_admin(&self, role: Role) -> Role {
        self.table.read().admin_of(role)
    }

    /// Number of accounts holding `role`.
    #[must_use]
    pub fn member_count(&self, role: Role) -> usize {
        self.table.read().members.get(&role).map_or(0, HashSet::len)
    }

    /// Grants `role` to `account`. No-op if already held.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` does not hold the admin role of `role`.
    pub fn grant_role(&self, caller: Address, role: Role, account: Address) -> AccessResult<()> {
        let mut table = self.table.write();
        table.require(table.admin_of(role), caller)?;
        if table.members.entry(role).or_default().insert(account) {
            info!(role = %role, account = %format!("{account:#x}"), "role granted");
        }
        Ok(())
    }

    /// Revokes `role` from `account`. No-op if not held.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` does not hold the admin role of `role`.
    pub fn revoke_role(&self, caller: Address, role: Role, account: Address) -> AccessResult<()> {
        let mut table = self.table.write();
        table.require(table.admin_of(role), caller)?;
        if let Some(members) = table.members.get_mut(&role) {
            if members.remove(&account) {
                info!(role = %role, account = %format!("{account:#x}"), "role revoked");
            }
        }
        Ok(())
    }

    /// Gives up `role`. `account` must be the caller.
    ///
    /// # Errors
    ///
    /// `RenounceForOther` if `account != caller`.
    pub fn renounce_role(&self, caller: Address, role: Role, account: Address) -> AccessResult<()> {
        if caller != account {
            return Err(AccessError::RenounceForOther { caller, account });
        }
        let mut table = self.table.write();
        if let Some(members) = table.members.get_mut(&role) {
            members.remove(&account);
        }
        Ok(())
    }

    /// Changes the admin role of `role`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` does not hold the current admin role of `role`.
    pub fn set_role_admin(&self, caller: Address, role: Role, admin_role: Role) -> AccessResult<()> {
        let mut table = self.table.write();
        table.require(table.admin_of(role), caller)?;
        table.admins.insert(role, admin_role);
        Ok(())
    }
}

impl AccessControl for RoleRegistry {
    fn has_role(&self, role: Role, account: Address) -> bool {
        self.table.read().holds(role, account)
    }
}
