//! # Config CLI
//!
//! `mintgate config check FILE` loads an engine configuration, validates
//! it, bootstraps an engine from it, and prints a JSON summary including
//! the constructor arguments a deployment would record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use mintgate_core::HashAlgorithm;
use mintgate_engine::{BulkMintPolicy, Engine, EngineConfig, Principal, Role, Root};

/// Config subcommand arguments.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate an engine configuration.
    Check {
        /// YAML configuration file.
        file: PathBuf,

        /// Apply MINTGATE_* environment overrides before validating.
        #[arg(long)]
        env: bool,
    },
}

/// Summary printed by `config check`.
#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
    pub admin: Principal,
    pub trusted_forwarder: Option<Principal>,
    pub bulk_policy: BulkMintPolicy,
    pub hash_algorithm: HashAlgorithm,
    pub merkle_root: Option<Root>,
    pub administrators: Vec<Principal>,
    pub constructor_args: serde_json::Value,
}

/// Execute the config subcommand. A `--hash` given on the command line
/// replaces the configured algorithm.
pub fn run_config(args: &ConfigArgs, hash: Option<HashAlgorithm>) -> Result<u8> {
    match &args.command {
        ConfigCommand::Check { file, env } => {
            let summary = check(file, *env, hash)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(0)
        }
    }
}

/// Load, override, validate, and bootstrap.
pub fn check(path: &Path, env: bool, hash: Option<HashAlgorithm>) -> Result<ConfigSummary> {
    let mut config = EngineConfig::from_file(path)?;
    if env {
        config = config.apply_env()?;
    }
    if let Some(algorithm) = hash {
        config = config.with_hash_algorithm(algorithm);
    }

    let admin = config.admin;
    let constructor_args = config.constructor_args();
    let engine = Engine::new(config)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    tracing::info!(path = %path.display(), "configuration ok");

    Ok(ConfigSummary {
        name: engine.name()?,
        symbol: engine.symbol()?,
        base_uri: engine.base_uri()?,
        admin,
        trusted_forwarder: engine.trusted_forwarder(),
        bulk_policy: engine.bulk_policy()?,
        hash_algorithm: engine.hash_algorithm()?,
        merkle_root: engine.merkle_root()?,
        administrators: engine.role_members(Role::Administrator)?,
        constructor_args,
    })
}
