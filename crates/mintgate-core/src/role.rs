//! # Roles
//!
//! The closed set of capabilities a principal can hold. Roles are
//! independent tags, not levels: holding `Administrator` does not satisfy
//! a `Minter` check. The derived `Ord` only fixes iteration order.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// A capability tag held by a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May grant and revoke roles, rotate the allowlist root, and update
    /// metadata.
    Administrator,
    /// Operational role granted at bootstrap. No engine entry point
    /// requires it today.
    Executor,
    /// May issue tokens to arbitrary recipients.
    Minter,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 3] = [Role::Administrator, Role::Executor, Role::Minter];

    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Executor => "executor",
            Self::Minter => "minter",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = FormatError;

    /// Accepts the snake_case names as well as the conventional
    /// `DEFAULT_ADMIN_ROLE` / `EXECUTOR_ROLE` / `MINTER_ROLE` constants.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" | "default_admin_role" => Ok(Self::Administrator),
            "executor" | "executor_role" => Ok(Self::Executor),
            "minter" | "minter_role" => Ok(Self::Minter),
            other => Err(FormatError::UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}
