//! # mintgate-crypto — Allowlist Cryptography
//!
//! Provides the membership-proof machinery behind the allowlist mint path:
//!
//! - **Hashing** (`hasher.rs`): Keccak-256 and SHA-256 over raw bytes,
//!   selected by [`HashAlgorithm`](mintgate_core::HashAlgorithm).
//! - **Merkle** (`merkle.rs`): leaf derivation from a principal, the
//!   sorted-pair node rule, proof folding, and [`AllowlistTree`] for
//!   building roots and proofs off-line.
//!
//! ## Crate Policy
//!
//! - Depends only on `mintgate-core` internally.
//! - Verification never errors. A proof either folds to the root or it
//!   does not; malformed siblings are rejected earlier, at parse time.
//! - Tests use real hashes, no mocks.

pub mod hasher;
pub mod merkle;

pub use hasher::{digest, digest_concat};
pub use merkle::{hash_leaf, hash_pair, AllowlistTree, MerkleVerifier, Proof};
