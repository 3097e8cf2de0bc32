//! # mintgate-engine — Issuance Engine
//!
//! Orchestrates the allowlist verifier, the access registry, and the token
//! ledger into the public mint surface.
//!
//! ## Mint Paths
//!
//! - **Privileged** (`mint`, `bulk_mint`): the caller must hold `Minter`.
//!   Bulk mints follow a [`BulkMintPolicy`]: check the role once for the
//!   whole batch, or again before every issuance.
//! - **Allowlist** (`mint_allowlisted`): the caller proves its own
//!   address is in the committed allowlist and receives the token itself.
//!
//! ## Layers
//!
//! - [`MintController`] (`controller.rs`): single-threaded state machine
//!   that owns all state and implements every operation.
//! - [`Engine`] (`engine.rs`): cloneable, thread-safe façade. One write
//!   lock per mutation, shared read lock for queries, and trusted-forwarder
//!   caller resolution.
//! - [`EngineConfig`] (`config.rs`): construction parameters from YAML
//!   and environment.
//! - [`EventLog`] (`event.rs`): append-only journal of committed changes.
//! - [`TokenReceiver`] (`receiver.rs`): hooks run when a principal
//!   receives a token.

pub mod config;
pub mod controller;
pub mod engine;
pub mod event;
pub mod policy;
pub mod receiver;

pub use config::{ConfigError, EngineConfig};
pub use controller::MintController;
pub use engine::{CallContext, Engine};
pub use event::{EngineEvent, EventLog, EventRecord};
pub use policy::BulkMintPolicy;
pub use receiver::{ReceiverContext, TokenReceiver};

pub use mintgate_core::{Hash32, HashAlgorithm, MintError, Principal, Role, Root, TokenId};
pub use mintgate_crypto::{AllowlistTree, Proof};
