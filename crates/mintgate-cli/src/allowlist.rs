//! # Allowlist CLI
//!
//! Builds roots and proofs from an allowlist file and verifies proofs.
//!
//! The file holds one address per line. Blank lines are skipped, and `#`
//! starts a comment that runs to the end of the line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use mintgate_core::{HashAlgorithm, Hash32, Leaf, Principal, Root};
use mintgate_crypto::{AllowlistTree, MerkleVerifier, Proof};

/// Allowlist subcommand arguments.
#[derive(Args, Debug)]
pub struct AllowlistArgs {
    #[command(subcommand)]
    pub command: AllowlistCommand,
}

/// Available allowlist subcommands.
#[derive(Subcommand, Debug)]
pub enum AllowlistCommand {
    /// Print the root committing to every address in FILE.
    Root {
        /// Allowlist file, one address per line.
        file: PathBuf,
    },

    /// Print the membership proof for ADDRESS as JSON.
    Proof {
        /// Allowlist file, one address per line.
        file: PathBuf,

        /// Member address to prove.
        address: Principal,
    },

    /// Check a proof against a root. Exits 0 when valid, 1 otherwise.
    Verify {
        /// Committed allowlist root.
        #[arg(long)]
        root: Root,

        /// Address whose membership is claimed.
        #[arg(long)]
        address: Principal,

        /// Sibling hash, leaf to root. Repeat once per level.
        #[arg(long = "proof", value_name = "HASH")]
        proof: Vec<Hash32>,
    },
}

/// Proof report printed by `allowlist proof`.
#[derive(Debug, Serialize)]
pub struct ProofReport {
    pub address: Principal,
    pub leaf: Leaf,
    pub root: Root,
    pub proof: Proof,
}

/// Execute the allowlist subcommand.
pub fn run_allowlist(args: &AllowlistArgs, algorithm: HashAlgorithm) -> Result<u8> {
    match &args.command {
        AllowlistCommand::Root { file } => {
            let tree = load_tree(file, algorithm)?;
            tracing::info!(members = tree.len(), hash = %algorithm, "allowlist committed");
            println!("{}", tree.root());
            Ok(0)
        }
        AllowlistCommand::Proof { file, address } => {
            let report = build_proof(file, address, algorithm)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(0)
        }
        AllowlistCommand::Verify {
            root,
            address,
            proof,
        } => {
            let proof = Proof::new(proof.clone());
            if verify(root, address, &proof, algorithm) {
                println!("valid");
                Ok(0)
            } else {
                println!("invalid");
                Ok(1)
            }
        }
    }
}

/// Parse allowlist text into principals, in file order.
pub fn parse_allowlist(text: &str) -> Result<Vec<Principal>> {
    let mut members = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let entry = line.split('#').next().unwrap_or_default().trim();
        if entry.is_empty() {
            continue;
        }
        let principal = Principal::parse(entry)
            .with_context(|| format!("line {}: invalid address {entry:?}", number + 1))?;
        members.push(principal);
    }
    Ok(members)
}

/// Read and parse an allowlist file.
pub fn read_allowlist(path: &Path) -> Result<Vec<Principal>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read allowlist: {}", path.display()))?;
    parse_allowlist(&text).with_context(|| format!("in {}", path.display()))
}

/// Build the tree committing to an allowlist file.
pub fn load_tree(path: &Path, algorithm: HashAlgorithm) -> Result<AllowlistTree> {
    let members = read_allowlist(path)?;
    AllowlistTree::from_principals(algorithm, &members)
        .with_context(|| format!("cannot build allowlist from {}", path.display()))
}

/// Build the proof report for `address`, failing if it is not listed.
pub fn build_proof(path: &Path, address: &Principal, algorithm: HashAlgorithm) -> Result<ProofReport> {
    let tree = load_tree(path, algorithm)?;
    let Some(proof) = tree.proof_for(address) else {
        bail!("{address} is not in {}", path.display());
    };
    Ok(ProofReport {
        address: *address,
        leaf: mintgate_crypto::hash_leaf(algorithm, address),
        root: tree.root(),
        proof,
    })
}

/// Whether `proof` places `address` under `root`.
pub fn verify(root: &Root, address: &Principal, proof: &Proof, algorithm: HashAlgorithm) -> bool {
    let verifier = MerkleVerifier::new(algorithm);
    verifier.verify(&verifier.hash_leaf(address), proof, root)
}
