//! # Bulk Mint Authorization Policy

use serde::{Deserialize, Serialize};

use mintgate_core::FormatError;

/// How often a bulk mint checks the caller's `Minter` role.
///
/// Both policies issue in input order and never roll back. They differ
/// only when the caller's role changes during the batch (through a
/// [`TokenReceiver`](crate::TokenReceiver) hook): `RequireOnce` finishes
/// the batch, `RequireAgain` stops at the first failed check and keeps
/// what it already issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkMintPolicy {
    /// One role check before the first issuance.
    #[default]
    RequireOnce,
    /// A role check before every issuance.
    RequireAgain,
}

impl BulkMintPolicy {
    /// Return the string representation of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequireOnce => "require_once",
            Self::RequireAgain => "require_again",
        }
    }
}

impl std::fmt::Display for BulkMintPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BulkMintPolicy {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "require_once" | "once" => Ok(Self::RequireOnce),
            "require_again" | "again" => Ok(Self::RequireAgain),
            other => Err(FormatError::UnknownVariant {
                kind: "bulk mint policy",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!("require-again".parse::<BulkMintPolicy>().unwrap(), BulkMintPolicy::RequireAgain);
        assert_eq!("REQUIRE_ONCE".parse::<BulkMintPolicy>().unwrap(), BulkMintPolicy::RequireOnce);
        assert!("sometimes".parse::<BulkMintPolicy>().is_err());
        assert_eq!(BulkMintPolicy::default(), BulkMintPolicy::RequireOnce);
        assert_eq!(BulkMintPolicy::RequireAgain.to_string(), "require_again");
    }
}
