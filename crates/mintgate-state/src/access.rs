//! # Access Registry
//!
//! Role assignment and permission checks for privileged operations.
//!
//! ## Rules
//!
//! - Only a holder of `Administrator` may grant or revoke any role.
//! - Checks are per role. `Administrator` does not imply `Minter`; the
//!   bootstrap administrator is granted all three roles explicitly.
//! - Granting a held role, or revoking an unheld one, is a successful
//!   no-op.
//! - `Administrator` can never be removed from its last holder, whether
//!   by revocation or by renouncing it.

use std::collections::{BTreeMap, BTreeSet};

use mintgate_core::{MintError, Principal, Role};

// ─── Registry ────────────────────────────────────────────────────────

/// Mapping from principal to the set of roles it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRegistry {
    holders: BTreeMap<Principal, BTreeSet<Role>>,
}

impl AccessRegistry {
    /// Create a registry in which nobody holds any role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose initial administrator holds every role.
    pub fn bootstrap(admin: Principal) -> Self {
        let mut registry = Self::new();
        registry
            .holders
            .insert(admin, Role::ALL.iter().copied().collect());
        tracing::info!(admin = %admin, "access registry bootstrapped");
        registry
    }

    /// Whether `principal` holds `role`.
    pub fn has_role(&self, principal: &Principal, role: Role) -> bool {
        self.holders
            .get(principal)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Fail with [`MintError::Unauthorized`] unless `principal` holds `role`.
    pub fn require_role(&self, principal: &Principal, role: Role) -> Result<(), MintError> {
        if self.has_role(principal, role) {
            Ok(())
        } else {
            tracing::warn!(principal = %principal, role = %role, "role check failed");
            Err(MintError::Unauthorized {
                principal: *principal,
                role,
            })
        }
    }

    /// Assign `role` to `target`. Requires `caller` to be an administrator.
    ///
    /// Returns `true` if the role was newly assigned.
    pub fn grant(
        &mut self,
        caller: &Principal,
        role: Role,
        target: Principal,
    ) -> Result<bool, MintError> {
        self.require_role(caller, Role::Administrator)?;
        let added = self.holders.entry(target).or_default().insert(role);
        if added {
            tracing::info!(caller = %caller, role = %role, target = %target, "role granted");
        }
        Ok(added)
    }

    /// Remove `role` from `target`. Requires `caller` to be an administrator.
    ///
    /// Returns `true` if the role was held and is now removed.
    pub fn revoke(
        &mut self,
        caller: &Principal,
        role: Role,
        target: &Principal,
    ) -> Result<bool, MintError> {
        self.require_role(caller, Role::Administrator)?;
        let removed = self.remove(role, target)?;
        if removed {
            tracing::info!(caller = %caller, role = %role, target = %target, "role revoked");
        }
        Ok(removed)
    }

    /// Drop one of the caller's own roles. Needs no other permission.
    pub fn renounce(&mut self, caller: &Principal, role: Role) -> Result<bool, MintError> {
        let removed = self.remove(role, caller)?;
        if removed {
            tracing::info!(caller = %caller, role = %role, "role renounced");
        }
        Ok(removed)
    }

    /// Roles held by `principal`, in declaration order.
    pub fn roles_of(&self, principal: &Principal) -> Vec<Role> {
        self.holders
            .get(principal)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Principals holding `role`, sorted by address.
    pub fn members(&self, role: Role) -> Vec<Principal> {
        self.holders
            .iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(p, _)| *p)
            .collect()
    }

    /// Number of principals holding `role`.
    pub fn member_count(&self, role: Role) -> usize {
        self.holders
            .values()
            .filter(|roles| roles.contains(&role))
            .count()
    }

    fn remove(&mut self, role: Role, target: &Principal) -> Result<bool, MintError> {
        if !self.has_role(target, role) {
            return Ok(false);
        }
        if role == Role::Administrator && self.member_count(Role::Administrator) == 1 {
            return Err(MintError::LastAdministrator(*target));
        }
        if let Some(roles) = self.holders.get_mut(target) {
            roles.remove(&role);
            if roles.is_empty() {
                self.holders.remove(target);
            }
        }
        Ok(true)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
