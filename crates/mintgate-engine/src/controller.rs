//! # Mint Controller
//!
//! Owns all engine state and implements every operation. Authorization is
//! decided before anything is written:
//!
//! ```text
//! mint / bulk_mint ──▶ require Minter ──▶ ledger.issue (per recipient, in order)
//! mint_allowlisted ──▶ verify H(caller) against root ──▶ ledger.issue(caller)
//! set_merkle_root  ──▶ require Administrator ──▶ overwrite root
//! ```
//!
//! ## Atomicity
//!
//! A failed call changes nothing, with one exception: under
//! [`BulkMintPolicy::RequireAgain`] a role check that fails part-way
//! through a batch leaves the earlier issuances committed and reports them
//! in [`MintError::BatchInterrupted`].
//!
//! The controller is not synchronized. [`Engine`](crate::Engine) wraps it
//! in a lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use mintgate_core::{HashAlgorithm, MintError, Principal, Role, Root, TokenId};
use mintgate_crypto::{MerkleVerifier, Proof};
use mintgate_state::{AccessRegistry, TokenLedger};

use crate::config::{ConfigError, EngineConfig};
use crate::event::{EngineEvent, EventLog, EventRecord};
use crate::policy::BulkMintPolicy;
use crate::receiver::{self, HookScope, ReceiverContext, TokenReceiver};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// The issuance state machine.
pub struct MintController {
    instance: u64,
    name: String,
    symbol: String,
    base_uri: String,
    bulk_policy: BulkMintPolicy,
    verifier: MerkleVerifier,
    merkle_root: Option<Root>,
    registry: AccessRegistry,
    ledger: TokenLedger,
    events: EventLog,
    receivers: HashMap<Principal, Box<dyn TokenReceiver>>,
}

impl std::fmt::Debug for MintController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintController")
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("bulk_policy", &self.bulk_policy)
            .field("hash_algorithm", &self.verifier.algorithm())
            .field("merkle_root", &self.merkle_root)
            .field("total_supply", &self.ledger.total_supply())
            .field("receivers", &self.receivers.len())
            .finish()
    }
}

impl MintController {
    /// Validate `config` and bootstrap a controller. The configured
    /// administrator receives every role.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let admin = config.admin;

        let mut events = EventLog::new();
        for role in Role::ALL {
            events.push(EngineEvent::RoleGranted {
                role,
                account: admin,
                sender: admin,
            });
        }
        if let Some(root) = config.merkle_root {
            events.push(EngineEvent::MerkleRootUpdated {
                previous: None,
                current: root,
            });
        }

        tracing::info!(
            name = %config.name,
            symbol = %config.symbol,
            admin = %admin,
            bulk_policy = %config.bulk_policy,
            hash = %config.hash_algorithm,
            "mint controller initialized"
        );

        Ok(Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            name: config.name,
            symbol: config.symbol,
            base_uri: config.base_uri,
            bulk_policy: config.bulk_policy,
            verifier: MerkleVerifier::new(config.hash_algorithm),
            merkle_root: config.merkle_root,
            registry: AccessRegistry::bootstrap(admin),
            ledger: TokenLedger::new(),
            events,
            receivers: HashMap::new(),
        })
    }

    // ── Privileged mint path ────────────────────────────────────────

    /// Issue one token to `recipient`. Requires `Minter`.
    pub fn mint(&mut self, caller: &Principal, recipient: Principal) -> Result<TokenId, MintError> {
        self.registry.require_role(caller, Role::Minter)?;
        let recipient = recipient.require_nonzero()?;
        self.issue_to(recipient)
    }

    /// Issue one token per recipient, in input order, under the
    /// configured [`BulkMintPolicy`].
    pub fn bulk_mint(
        &mut self,
        caller: &Principal,
        recipients: &[Principal],
    ) -> Result<Vec<TokenId>, MintError> {
        self.bulk_mint_with_policy(caller, recipients, self.bulk_policy)
    }

    /// Issue one token per recipient, in input order, under an explicit
    /// policy.
    ///
    /// Every recipient is format-checked before anything is issued. The
    /// returned identifiers are contiguous.
    pub fn bulk_mint_with_policy(
        &mut self,
        caller: &Principal,
        recipients: &[Principal],
        policy: BulkMintPolicy,
    ) -> Result<Vec<TokenId>, MintError> {
        self.registry.require_role(caller, Role::Minter)?;
        for recipient in recipients {
            recipient.require_nonzero()?;
        }

        let mut committed = Vec::with_capacity(recipients.len());
        for (position, recipient) in recipients.iter().enumerate() {
            let step = match policy {
                BulkMintPolicy::RequireAgain if position > 0 => self
                    .registry
                    .require_role(caller, Role::Minter)
                    .and_then(|()| self.issue_to(*recipient)),
                _ => self.issue_to(*recipient),
            };
            match step {
                Ok(id) => committed.push(id),
                Err(source) if committed.is_empty() => return Err(source),
                Err(source) => {
                    tracing::warn!(
                        caller = %caller,
                        policy = %policy,
                        committed = committed.len(),
                        requested = recipients.len(),
                        error = %source,
                        "bulk mint interrupted"
                    );
                    return Err(MintError::BatchInterrupted {
                        committed,
                        source: Box::new(source),
                    });
                }
            }
        }

        tracing::info!(
            caller = %caller,
            policy = %policy,
            count = committed.len(),
            first = committed.first().map(TokenId::get),
            last = committed.last().map(TokenId::get),
            "bulk mint committed"
        );
        Ok(committed)
    }

    // ── Allowlist mint path ─────────────────────────────────────────

    /// Issue one token to `caller` if it proves allowlist membership
    /// against the active root. With no root set, every proof fails.
    ///
    /// Proofs are not consumed; a member may mint again with the same
    /// proof.
    pub fn mint_allowlisted(&mut self, caller: &Principal, proof: &Proof) -> Result<TokenId, MintError> {
        let leaf = self.verifier.hash_leaf(caller);
        let valid = self
            .merkle_root
            .as_ref()
            .is_some_and(|root| self.verifier.verify(&leaf, proof, root));
        if !valid {
            tracing::warn!(
                caller = %caller,
                root_set = self.merkle_root.is_some(),
                siblings = proof.len(),
                "allowlist proof rejected"
            );
            return Err(MintError::InvalidProof);
        }
        let caller = caller.require_nonzero()?;
        self.issue_to(caller)
    }

    /// Replace the allowlist root. Requires `Administrator`.
    pub fn set_merkle_root(&mut self, caller: &Principal, root: Root) -> Result<(), MintError> {
        self.registry.require_role(caller, Role::Administrator)?;
        let previous = self.merkle_root.replace(root);
        self.events.push(EngineEvent::MerkleRootUpdated {
            previous,
            current: root,
        });
        tracing::info!(caller = %caller, root = %root, "merkle root updated");
        Ok(())
    }

    // ── Roles ───────────────────────────────────────────────────────

    /// Grant `role` to `target`. Requires `Administrator`.
    pub fn grant_role(
        &mut self,
        caller: &Principal,
        role: Role,
        target: Principal,
    ) -> Result<bool, MintError> {
        receiver::grant(&mut self.registry, &mut self.events, caller, role, target)
    }

    /// Revoke `role` from `target`. Requires `Administrator`.
    pub fn revoke_role(
        &mut self,
        caller: &Principal,
        role: Role,
        target: &Principal,
    ) -> Result<bool, MintError> {
        receiver::revoke(&mut self.registry, &mut self.events, caller, role, target)
    }

    /// Drop one of the caller's own roles.
    pub fn renounce_role(&mut self, caller: &Principal, role: Role) -> Result<bool, MintError> {
        let removed = self.registry.renounce(caller, role)?;
        if removed {
            self.events.push(EngineEvent::RoleRevoked {
                role,
                account: *caller,
                sender: *caller,
            });
        }
        Ok(removed)
    }

    // ── Metadata ────────────────────────────────────────────────────

    /// Replace the metadata base URI. Requires `Administrator`.
    pub fn set_base_uri(&mut self, caller: &Principal, base_uri: String) -> Result<(), MintError> {
        self.registry.require_role(caller, Role::Administrator)?;
        tracing::info!(caller = %caller, base_uri = %base_uri, "base uri updated");
        self.base_uri = base_uri.clone();
        self.events.push(EngineEvent::BaseUriUpdated { base_uri });
        Ok(())
    }

    /// Metadata location of `id`: the base URI followed by the decimal
    /// identifier, or empty when no base URI is set.
    pub fn token_uri(&self, id: TokenId) -> Result<String, MintError> {
        self.ledger.owner_of(id)?;
        if self.base_uri.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("{}{}", self.base_uri, id))
        }
    }

    /// Display name of the collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol of the collection.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current metadata base URI.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    // ── Hooks ───────────────────────────────────────────────────────

    /// Install the hook that runs whenever `principal` receives a token,
    /// replacing any previous one.
    pub fn install_receiver(&mut self, principal: Principal, hook: Box<dyn TokenReceiver>) {
        tracing::debug!(principal = %principal, "token receiver installed");
        self.receivers.insert(principal, hook);
    }

    /// Remove the hook for `principal`. Returns whether one was installed.
    pub fn remove_receiver(&mut self, principal: &Principal) -> bool {
        self.receivers.remove(principal).is_some()
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Count of all tokens ever issued.
    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Number of tokens owned by `owner`.
    pub fn balance_of(&self, owner: &Principal) -> u64 {
        self.ledger.balance_of(owner)
    }

    /// Owner of `id`.
    pub fn owner_of(&self, id: TokenId) -> Result<Principal, MintError> {
        self.ledger.owner_of(id)
    }

    /// Whether `id` has been issued.
    pub fn exists(&self, id: TokenId) -> bool {
        self.ledger.exists(id)
    }

    /// The `index`-th token issued to `owner`.
    pub fn token_of_owner_by_index(&self, owner: &Principal, index: u64) -> Result<TokenId, MintError> {
        self.ledger.token_of_owner_by_index(owner, index)
    }

    /// The `index`-th token ever issued.
    pub fn token_by_index(&self, index: u64) -> Result<TokenId, MintError> {
        self.ledger.token_by_index(index)
    }

    /// Tokens owned by `owner`, in issuance order.
    pub fn tokens_of_owner(&self, owner: &Principal) -> &[TokenId] {
        self.ledger.tokens_of_owner(owner)
    }

    /// Whether `principal` holds `role`.
    pub fn has_role(&self, principal: &Principal, role: Role) -> bool {
        self.registry.has_role(principal, role)
    }

    /// Principals holding `role`.
    pub fn role_members(&self, role: Role) -> Vec<Principal> {
        self.registry.members(role)
    }

    /// The active allowlist root, if any.
    pub fn merkle_root(&self) -> Option<Root> {
        self.merkle_root
    }

    /// Hash function used for allowlist leaves.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.verifier.algorithm()
    }

    /// The configured bulk mint policy.
    pub fn bulk_policy(&self) -> BulkMintPolicy {
        self.bulk_policy
    }

    /// Every journaled event.
    pub fn events(&self) -> &[EventRecord] {
        self.events.all()
    }

    /// Events after sequence number `seq`.
    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.events.since(seq)
    }

    /// Sequence number of the newest event.
    pub fn last_event_seq(&self) -> u64 {
        self.events.last_seq()
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Identifies this controller to the hook reentry check.
    pub(crate) fn instance(&self) -> u64 {
        self.instance
    }

    /// Record issuance to an already-validated recipient, then run its
    /// receiver hook.
    fn issue_to(&mut self, recipient: Principal) -> Result<TokenId, MintError> {
        let id = self.ledger.issue(recipient)?;
        self.events.push(EngineEvent::Transfer {
            from: Principal::ZERO,
            to: recipient,
            token_id: id,
        });
        if let Some(hook) = self.receivers.get_mut(&recipient) {
            let _scope = HookScope::enter(self.instance);
            let mut ctx = ReceiverContext::new(
                recipient,
                &mut self.registry,
                &self.ledger,
                &mut self.events,
            );
            hook.on_token_received(&mut ctx, id);
        }
        Ok(id)
    }
}
