//! # mintgate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mintgate_cli::allowlist::{run_allowlist, AllowlistArgs};
use mintgate_cli::config::{run_config, ConfigArgs};
use mintgate_core::HashAlgorithm;

/// mintgate — allowlist and configuration tooling for gated NFT issuance.
#[derive(Parser, Debug)]
#[command(name = "mintgate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Hash function for allowlist leaves and nodes [default: keccak256].
    #[arg(long, global = true, value_name = "ALGORITHM")]
    hash: Option<HashAlgorithm>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build allowlist roots and proofs, and verify proofs.
    Allowlist(AllowlistArgs),

    /// Check engine configuration files.
    Config(ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Allowlist(args) => run_allowlist(&args, cli.hash.unwrap_or_default()),
        Commands::Config(args) => run_config(&args, cli.hash),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
