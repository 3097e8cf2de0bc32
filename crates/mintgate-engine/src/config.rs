//! # Engine Configuration
//!
//! Construction parameters for an engine instance: display metadata, the
//! initial administrator, the optional trusted forwarder, and operating
//! modes.
//!
//! Loaded from YAML, then optionally overridden from the environment:
//!
//! - `MINTGATE_NAME`, `MINTGATE_SYMBOL`, `MINTGATE_BASE_URI`
//! - `MINTGATE_ADMIN`, `MINTGATE_FORWARDER` (empty string clears it)
//! - `MINTGATE_BULK_POLICY` (`require_once` | `require_again`)
//! - `MINTGATE_HASH` (`keccak256` | `sha256`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use mintgate_core::{HashAlgorithm, Principal, Root};

use crate::policy::BulkMintPolicy;

/// Construction parameters for a [`MintController`](crate::MintController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name of the collection.
    pub name: String,
    /// Ticker symbol of the collection.
    pub symbol: String,
    /// Prefix for per-token metadata locations. Not interpreted.
    #[serde(default)]
    pub base_uri: String,
    /// Initial administrator; receives every role at bootstrap.
    pub admin: Principal,
    /// Principal trusted to relay calls on behalf of others.
    #[serde(default)]
    pub trusted_forwarder: Option<Principal>,
    /// Authorization mode for bulk mints.
    #[serde(default)]
    pub bulk_policy: BulkMintPolicy,
    /// Hash function for allowlist leaves and nodes.
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
    /// Allowlist root to activate at bootstrap.
    #[serde(default)]
    pub merkle_root: Option<Root>,
}

impl EngineConfig {
    /// Minimal configuration with defaults for every optional field.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        base_uri: impl Into<String>,
        admin: Principal,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            base_uri: base_uri.into(),
            admin,
            trusted_forwarder: None,
            bulk_policy: BulkMintPolicy::default(),
            hash_algorithm: HashAlgorithm::default(),
            merkle_root: None,
        }
    }

    /// Set the trusted forwarder.
    pub fn with_trusted_forwarder(mut self, forwarder: Principal) -> Self {
        self.trusted_forwarder = Some(forwarder);
        self
    }

    /// Set the bulk mint policy.
    pub fn with_bulk_policy(mut self, policy: BulkMintPolicy) -> Self {
        self.bulk_policy = policy;
        self
    }

    /// Set the allowlist hash algorithm.
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Set the allowlist root active at bootstrap.
    pub fn with_merkle_root(mut self, root: Root) -> Self {
        self.merkle_root = Some(root);
        self
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `MINTGATE_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `MINTGATE_*` overrides from an arbitrary lookup.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(name) = lookup("MINTGATE_NAME") {
            self.name = name;
        }
        if let Some(symbol) = lookup("MINTGATE_SYMBOL") {
            self.symbol = symbol;
        }
        if let Some(base_uri) = lookup("MINTGATE_BASE_URI") {
            self.base_uri = base_uri;
        }
        if let Some(admin) = lookup("MINTGATE_ADMIN") {
            self.admin = parse_var("MINTGATE_ADMIN", &admin)?;
        }
        if let Some(forwarder) = lookup("MINTGATE_FORWARDER") {
            self.trusted_forwarder = if forwarder.trim().is_empty() {
                None
            } else {
                Some(parse_var("MINTGATE_FORWARDER", &forwarder)?)
            };
        }
        if let Some(policy) = lookup("MINTGATE_BULK_POLICY") {
            self.bulk_policy = parse_var("MINTGATE_BULK_POLICY", &policy)?;
        }
        if let Some(algorithm) = lookup("MINTGATE_HASH") {
            self.hash_algorithm = parse_var("MINTGATE_HASH", &algorithm)?;
        }
        Ok(self)
    }

    /// Check field-level constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Empty("name"));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Empty("symbol"));
        }
        if self.admin.is_zero() {
            return Err(ConfigError::ZeroAdmin);
        }
        Ok(())
    }

    /// Constructor arguments as a flat JSON array, in the order
    /// `[name, symbol, base_uri, admin, trusted_forwarder]`. An absent
    /// forwarder is rendered as the zero address.
    pub fn constructor_args(&self) -> serde_json::Value {
        serde_json::json!([
            self.name,
            self.symbol,
            self.base_uri,
            self.admin,
            self.trusted_forwarder.unwrap_or(Principal::ZERO),
        ])
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("config field `{0}` must not be empty")]
    Empty(&'static str),
    #[error("administrator must not be the zero address")]
    ZeroAdmin,
}
