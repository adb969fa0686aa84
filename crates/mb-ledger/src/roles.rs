//! Role membership for the access gate.
//!
//! `RoleSet` is a pure membership structure: it answers "does this account
//! hold this role" and records grants and revocations. Deciding *who may
//! change* membership is the ledger's job, not the set's.

use std::collections::{HashMap, HashSet};

use mb_types::{AccountId, Role};

use crate::error::{LedgerError, Result};

/// Per-role account membership.
#[derive(Debug, Clone, Default)]
pub struct RoleSet {
    members: HashMap<Role, HashSet<AccountId>>,
}

impl RoleSet {
    /// An empty set with no members in any role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership as created at ledger bootstrap: the deploying account
    /// holds [`Role::Admin`] and [`Role::SettlementSubmitter`].
    pub fn bootstrap(admin: AccountId) -> Self {
        let mut set = Self::new();
        set.grant(admin, Role::Admin);
        set.grant(admin, Role::SettlementSubmitter);
        set
    }

    /// Whether `account` currently holds `role`.
    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.members
            .get(&role)
            .is_some_and(|accounts| accounts.contains(account))
    }

    /// Errors with [`LedgerError::Unauthorized`] unless `account` holds `role`.
    pub fn require(&self, account: &AccountId, role: Role) -> Result<()> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                account: *account,
                role,
            })
        }
    }

    /// Adds `account` to `role`. Returns `true` if membership changed,
    /// `false` if the account already held the role.
    pub fn grant(&mut self, account: AccountId, role: Role) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Removes `account` from `role`. Returns `true` if membership changed,
    /// `false` if the account did not hold the role.
    pub fn revoke(&mut self, account: &AccountId, role: Role) -> bool {
        self.members
            .get_mut(&role)
            .is_some_and(|accounts| accounts.remove(account))
    }

    /// All roles currently held by `account`, in declaration order.
    pub fn roles_of(&self, account: &AccountId) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|role| self.has_role(account, *role))
            .collect()
    }
}
