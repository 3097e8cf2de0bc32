//! # mintgate-state — Registry and Ledger
//!
//! The two pieces of mutable state the engine owns:
//!
//! - **AccessRegistry** (`access.rs`): principal → role set, with
//!   administrator-only grant/revoke and a guard that keeps at least one
//!   administrator in place.
//!
//! - **TokenLedger** (`ledger.rs`): token → owner, owner → ordered token
//!   sequence, and the monotonically increasing identifier counter.
//!
//! ## Design
//!
//! Both types are plain owned structs mutated through `&mut self`. They do
//! no locking of their own; the engine holds them behind a single lock so
//! that every mutation, including a whole bulk batch, is one critical
//! section.

pub mod access;
pub mod ledger;

pub use access::AccessRegistry;
pub use ledger::TokenLedger;
