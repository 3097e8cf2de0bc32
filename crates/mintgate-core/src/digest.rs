//! # Fixed-Width Digests
//!
//! Defines `Hash32`, the 32-byte value used for allowlist leaves, proof
//! siblings, and committed roots, and `HashAlgorithm`, the tag naming the
//! one-way function that produced it.
//!
//! ## Text Form
//!
//! Digests render as `0x`-prefixed lowercase hex. Parsing accepts the
//! prefix or not, in either case, and rejects anything that does not
//! decode to exactly 32 bytes.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// The one-way hash function used for leaves and interior nodes.
///
/// Keccak-256 matches the EVM allowlist tooling. SHA-256 is offered for
/// deployments that do not need EVM compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// Keccak-256 (the pre-standard SHA-3 variant used by Ethereum).
    #[default]
    Keccak256,
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keccak256 => "keccak256",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" => Ok(Self::Keccak256),
            "sha256" => Ok(Self::Sha256),
            other => Err(FormatError::UnknownVariant {
                kind: "hash algorithm",
                value: other.to_string(),
            }),
        }
    }
}

/// A 32-byte digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash32([u8; 32]);

/// The hash of a single allowlist entry.
pub type Leaf = Hash32;

/// The committed summary hash of an allowlist.
pub type Root = Hash32;

impl Hash32 {
    /// Width of the digest in bytes.
    pub const LEN: usize = 32;

    /// The all-zero digest.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a 64-hex-digit string, with or without a `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, FormatError> {
        decode_fixed::<32>(s).map(Self)
    }

    /// Render as lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::str::FromStr for Hash32 {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Hash32 {
    type Error = FormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Hash32> for String {
    fn from(h: Hash32) -> Self {
        h.to_string()
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Decode an optionally `0x`-prefixed hex string into exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], FormatError> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(FormatError::InvalidHex(format!(
            "odd number of digits ({})",
            digits.len()
        )));
    }
    if digits.len() != N * 2 {
        return Err(FormatError::InvalidLength {
            expected: N,
            actual: digits.len() / 2,
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|e| FormatError::InvalidHex(e.to_string()))?;
    Ok(out)
}
