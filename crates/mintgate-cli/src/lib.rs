//! # mintgate-cli — Command-Line Tooling
//!
//! Off-line helpers for operating a mintgate deployment.
//!
//! ## Subcommands
//!
//! - `mintgate allowlist root` — Commit an allowlist file to a root.
//! - `mintgate allowlist proof` — Produce a member's proof as JSON.
//! - `mintgate allowlist verify` — Check a proof against a root.
//! - `mintgate config check` — Load, validate, and bootstrap an engine
//!   configuration.
//!
//! ```bash
//! mintgate allowlist root allowlist.txt
//! mintgate allowlist proof allowlist.txt 0xa2fb2553e57436b455f57270cc6f56f6dacda1a5
//! mintgate --hash sha256 allowlist verify --root 0x.. --address 0x.. --proof 0x..
//! mintgate config check engine.yaml --env
//! ```

pub mod allowlist;
pub mod config;
