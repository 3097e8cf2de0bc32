//! # mintgate-core — Foundational Types
//!
//! The leaf of the mintgate crate graph. Defines the identifiers and value
//! types every other crate speaks in, so that a token identifier can never
//! be confused with a balance and an address can never be confused with a
//! hash.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed-width newtypes.** `Principal` is exactly 20 bytes, `Hash32`
//!    exactly 32. Parsing from text is the only place a length can be
//!    wrong, and it fails with [`FormatError`].
//!
//! 2. **One role enum.** `Role` is a closed set. Permission checks name a
//!    variant, never a string.
//!
//! 3. **One error taxonomy.** [`MintError`] carries every recoverable
//!    outcome of the engine. Nothing in the engine panics on bad input.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mintgate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod role;
pub mod token;

pub use digest::{Hash32, HashAlgorithm, Leaf, Root};
pub use error::{FormatError, MintError};
pub use identity::Principal;
pub use role::Role;
pub use token::TokenId;
