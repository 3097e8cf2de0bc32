//! # Error Types — Engine Error Taxonomy
//!
//! Every outcome the engine reports to a caller is a variant of
//! [`MintError`]. All of them are recoverable: a failed call leaves engine
//! state as it was, with the single exception of an interrupted
//! re-checking bulk mint, which is reported as
//! [`MintError::BatchInterrupted`] together with the tokens it committed.
//!
//! [`MintError::Reentrant`] is a usage error rather than an engine
//! outcome: it rejects a receiver hook calling back into the engine that
//! is running it.

use thiserror::Error;

use crate::identity::Principal;
use crate::role::Role;
use crate::token::TokenId;

/// Top-level error type for mintgate operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    /// The principal does not hold the role the operation requires.
    #[error("{}", unauthorized_message(.principal, .role))]
    Unauthorized {
        /// The resolved caller.
        principal: Principal,
        /// The role that was required.
        role: Role,
    },

    /// Allowlist membership could not be proven against the active root.
    #[error("Invalid proof")]
    InvalidProof,

    /// Query against an identifier that was never issued.
    #[error("token {0} does not exist")]
    NotFound(TokenId),

    /// Enumeration index beyond the end of the sequence.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested position.
        index: u64,
        /// Length of the sequence that was indexed.
        len: u64,
    },

    /// Input failed format or length validation.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] FormatError),

    /// The operation would leave no principal holding `Administrator`.
    #[error("cannot remove the last administrator {0}")]
    LastAdministrator(Principal),

    /// A bulk mint stopped part-way. Tokens in `committed` stay issued.
    #[error("batch interrupted after {} issuance(s): {source}", .committed.len())]
    BatchInterrupted {
        /// Tokens issued before the failure, in issuance order.
        committed: Vec<TokenId>,
        /// The error that stopped the batch.
        source: Box<MintError>,
    },

    /// No more identifiers can be allocated.
    #[error("token identifier space exhausted")]
    SupplyExhausted,

    /// A receiver hook called back into the engine that is running it.
    #[error("engine called from inside one of its own receiver hooks")]
    Reentrant,
}

impl MintError {
    /// The error that actually stopped the operation, looking through
    /// [`MintError::BatchInterrupted`].
    pub fn root_cause(&self) -> &MintError {
        match self {
            Self::BatchInterrupted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the root cause is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.root_cause(), Self::Unauthorized { .. })
    }
}

fn unauthorized_message(principal: &Principal, role: &Role) -> String {
    match role {
        Role::Administrator => "caller is not the owner".to_string(),
        other => format!("account {principal} is missing role {other}"),
    }
}

/// Error parsing an identity, digest, or enumerated name from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Decoded byte length does not match the fixed width.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required width in bytes.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },

    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The zero address cannot own tokens.
    #[error("the zero address is not a valid recipient")]
    ZeroAddress,

    /// A collection that must be non-empty was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Name does not match any known variant.
    #[error("unknown {kind} `{value}`")]
    UnknownVariant {
        /// What was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}
