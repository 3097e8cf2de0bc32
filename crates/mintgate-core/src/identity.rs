//! # Principal Identity
//!
//! A `Principal` is any caller or token owner: an end user, an
//! administrator, or a relayed caller. Its canonical byte form is the
//! 20-byte address, and that is exactly what allowlist leaves are hashed
//! from.

use serde::{Deserialize, Serialize};

use crate::digest::decode_fixed;
use crate::error::FormatError;

/// A 20-byte address identifying a caller or owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal([u8; 20]);

impl Principal {
    /// Width of an address in bytes.
    pub const LEN: usize = 20;

    /// The zero address. Never a valid issuance recipient.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Wrap raw address bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Access the canonical byte representation.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a 40-hex-digit address, with or without a `0x` prefix.
    /// Mixed-case (checksummed) input is accepted; the checksum is not checked.
    pub fn parse(s: &str) -> Result<Self, FormatError> {
        decode_fixed::<20>(s).map(Self)
    }

    /// Reject the zero address. Used where the principal will own a token.
    pub fn require_nonzero(self) -> Result<Self, FormatError> {
        if self.is_zero() {
            Err(FormatError::ZeroAddress)
        } else {
            Ok(self)
        }
    }
}

impl AsRef<[u8]> for Principal {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::str::FromStr for Principal {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = FormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.to_string()
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
