//! Caller identities and role grants.
//!
//! Every mutating operation receives the authenticated [`Caller`] explicitly.
//! Privileged operations check a required [`Role`] up front instead of relying
//! on any ambient "current sender".

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{audit::AdminChange, error::CommonError, Address};

/// Capabilities that can be granted to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Single-writer admin: skill rates, oracle set, quality floor, roles.
    Admin,
    /// May credit collateral stakes on behalf of workers (held by the ledger).
    StakeCreditor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("ADMIN"),
            Role::StakeCreditor => f.write_str("STAKE_CREDITOR"),
        }
    }
}

/// Authenticated identity plus the roles it held when the call started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    address: Address,
    roles: BTreeSet<Role>,
}

impl Caller {
    pub fn new(address: Address, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            address,
            roles: roles.into_iter().collect(),
        }
    }

    /// An identity with no granted roles.
    pub fn unprivileged(address: Address) -> Self {
        Self::new(address, [])
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn require(&self, role: Role) -> Result<(), CommonError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(CommonError::MissingRole {
                caller: self.address,
                role,
            })
        }
    }
}

/// `{identity -> granted roles}` table.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    grants: HashMap<Address, BTreeSet<Role>>,
}

impl AccessControl {
    pub fn with_admin(admin: Address) -> Self {
        let mut access = Self::default();
        access.grants.entry(admin).or_default().insert(Role::Admin);
        access
    }

    /// Resolve the caller context for an authenticated address.
    pub fn caller(&self, address: Address) -> Caller {
        let roles = self.grants.get(&address).cloned().unwrap_or_default();
        Caller { address, roles }
    }

    pub fn has_role(&self, address: &Address, role: Role) -> bool {
        self.grants
            .get(address)
            .map(|roles| roles.contains(&role))
            .unwrap_or(false)
    }

    pub fn members(&self, role: Role) -> Vec<Address> {
        let mut members: Vec<Address> = self
            .grants
            .iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(addr, _)| *addr)
            .collect();
        members.sort();
        members
    }

    pub fn grant_role(
        &mut self,
        caller: &Caller,
        role: Role,
        account: Address,
    ) -> Result<AdminChange, CommonError> {
        caller.require(Role::Admin)?;
        let roles = self.grants.entry(account).or_default();
        let before = roles.contains(&role);
        roles.insert(role);
        Ok(AdminChange::RoleGranted {
            account,
            role,
            before,
            after: true,
        })
    }

    pub fn revoke_role(
        &mut self,
        caller: &Caller,
        role: Role,
        account: Address,
    ) -> Result<AdminChange, CommonError> {
        caller.require(Role::Admin)?;
        if role == Role::Admin && self.members(Role::Admin) == [account] {
            return Err(CommonError::LastAdmin(account));
        }
        let before = match self.grants.get_mut(&account) {
            Some(roles) => roles.remove(&role),
            None => false,
        };
        if self.grants.get(&account).is_some_and(|roles| roles.is_empty()) {
            self.grants.remove(&account);
        }
        Ok(AdminChange::RoleRevoked {
            account,
            role,
            before,
            after: false,
        })
    }
}
