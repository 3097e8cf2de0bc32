//! # Token Identifiers

use serde::{Deserialize, Serialize};

/// Identifier of an issued token. Strictly increasing, first value 1,
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl TokenId {
    /// The identifier assigned to the first issued token.
    pub const FIRST: Self = Self(1);

    /// Access the inner integer.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The identifier following this one, or `None` on overflow.
    pub fn checked_next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for TokenId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
