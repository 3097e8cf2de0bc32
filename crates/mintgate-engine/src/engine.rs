//! # Engine
//!
//! Thread-safe, cloneable handle over a [`MintController`].
//!
//! Every mutation takes the write lock exactly once, so a bulk mint is a
//! single critical section and issuances from concurrent callers never
//! interleave inside a batch. Queries share the read lock and return owned
//! values. The lock is `parking_lot` and never poisons.
//!
//! Receiver hooks run while the write lock is held. A hook that calls back
//! into its own engine gets [`MintError::Reentrant`] rather than blocking
//! on a lock its own thread already holds.
//!
//! Callers are identified by a [`CallContext`]. When the direct sender is
//! the configured trusted forwarder, the principal it relays for becomes
//! the effective caller; the controller only ever sees resolved principals.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use mintgate_core::{HashAlgorithm, MintError, Principal, Role, Root, TokenId};
use mintgate_crypto::Proof;

use crate::config::{ConfigError, EngineConfig};
use crate::controller::MintController;
use crate::event::EventRecord;
use crate::policy::BulkMintPolicy;
use crate::receiver::{self, TokenReceiver};

// -- Call Context -------------------------------------------------------------

/// Who is calling: the direct sender, and optionally the principal a
/// forwarder is relaying for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The principal that submitted the call.
    pub sender: Principal,
    /// The principal a forwarder claims to act for. Honoured only when
    /// `sender` is the trusted forwarder.
    pub relayed_for: Option<Principal>,
}

impl CallContext {
    /// A call made directly by `sender`.
    pub fn direct(sender: Principal) -> Self {
        Self {
            sender,
            relayed_for: None,
        }
    }

    /// A call submitted by `forwarder` on behalf of `origin`.
    pub fn relayed(forwarder: Principal, origin: Principal) -> Self {
        Self {
            sender: forwarder,
            relayed_for: Some(origin),
        }
    }
}

impl From<Principal> for CallContext {
    fn from(sender: Principal) -> Self {
        Self::direct(sender)
    }
}

// -- Engine -------------------------------------------------------------------

/// Shared handle to one engine instance.
///
/// Every method that touches state returns [`MintError::Reentrant`] when
/// called from inside one of this engine's own receiver hooks.
#[derive(Debug, Clone)]
pub struct Engine {
    inner: Arc<RwLock<MintController>>,
    instance: u64,
    forwarder: Option<Principal>,
}

impl Engine {
    /// Validate `config` and bootstrap a new engine.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let forwarder = config.trusted_forwarder;
        let controller = MintController::new(config)?;
        Ok(Self {
            instance: controller.instance(),
            inner: Arc::new(RwLock::new(controller)),
            forwarder,
        })
    }

    /// The configured trusted forwarder.
    pub fn trusted_forwarder(&self) -> Option<Principal> {
        self.forwarder
    }

    /// Whether `principal` is the trusted forwarder.
    pub fn is_trusted_forwarder(&self, principal: &Principal) -> bool {
        self.forwarder.as_ref() == Some(principal)
    }

    /// The principal a call is attributed to.
    ///
    /// A `relayed_for` from anyone but the trusted forwarder is ignored.
    pub fn resolve_caller(&self, ctx: impl Into<CallContext>) -> Principal {
        let ctx = ctx.into();
        match ctx.relayed_for {
            Some(origin) if self.is_trusted_forwarder(&ctx.sender) => {
                tracing::trace!(forwarder = %ctx.sender, origin = %origin, "relayed call");
                origin
            }
            _ => ctx.sender,
        }
    }

    /// Run `f` against the controller under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MintController) -> R) -> Result<R, MintError> {
        Ok(f(&*self.shared()?))
    }

    // The lock is held for the whole of a hook, so a hook reaching back in
    // on the same thread is refused before it can block on it.
    fn ensure_not_in_hook(&self) -> Result<(), MintError> {
        if receiver::hook_running(self.instance) {
            tracing::warn!("engine called from inside its own receiver hook");
            return Err(MintError::Reentrant);
        }
        Ok(())
    }

    fn shared(&self) -> Result<RwLockReadGuard<'_, MintController>, MintError> {
        self.ensure_not_in_hook()?;
        Ok(self.inner.read())
    }

    fn exclusive(&self) -> Result<RwLockWriteGuard<'_, MintController>, MintError> {
        self.ensure_not_in_hook()?;
        Ok(self.inner.write())
    }

    // -- Mutations ------------------------------------------------------------

    /// Issue one token to `recipient`. The caller must hold `Minter`.
    pub fn mint(&self, ctx: impl Into<CallContext>, recipient: Principal) -> Result<TokenId, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.mint(&caller, recipient)
    }

    /// Issue one token per recipient under the configured bulk policy.
    pub fn bulk_mint(
        &self,
        ctx: impl Into<CallContext>,
        recipients: &[Principal],
    ) -> Result<Vec<TokenId>, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.bulk_mint(&caller, recipients)
    }

    /// Issue one token per recipient under `policy`.
    pub fn bulk_mint_with_policy(
        &self,
        ctx: impl Into<CallContext>,
        recipients: &[Principal],
        policy: BulkMintPolicy,
    ) -> Result<Vec<TokenId>, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?
            .bulk_mint_with_policy(&caller, recipients, policy)
    }

    /// Issue one token to the caller on proof of allowlist membership.
    pub fn mint_allowlisted(&self, ctx: impl Into<CallContext>, proof: &Proof) -> Result<TokenId, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.mint_allowlisted(&caller, proof)
    }

    /// Replace the allowlist root. Administrator only.
    pub fn set_merkle_root(&self, ctx: impl Into<CallContext>, root: Root) -> Result<(), MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.set_merkle_root(&caller, root)
    }

    /// Replace the metadata base URI. Administrator only.
    pub fn set_base_uri(&self, ctx: impl Into<CallContext>, base_uri: impl Into<String>) -> Result<(), MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.set_base_uri(&caller, base_uri.into())
    }

    /// Grant `role` to `target`. Administrator only.
    pub fn grant_role(
        &self,
        ctx: impl Into<CallContext>,
        role: Role,
        target: Principal,
    ) -> Result<bool, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.grant_role(&caller, role, target)
    }

    /// Revoke `role` from `target`. Administrator only.
    pub fn revoke_role(
        &self,
        ctx: impl Into<CallContext>,
        role: Role,
        target: &Principal,
    ) -> Result<bool, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.revoke_role(&caller, role, target)
    }

    /// Drop one of the caller's own roles.
    pub fn renounce_role(&self, ctx: impl Into<CallContext>, role: Role) -> Result<bool, MintError> {
        let caller = self.resolve_caller(ctx);
        self.exclusive()?.renounce_role(&caller, role)
    }

    /// Install a receiver hook for `principal`, replacing any previous one.
    pub fn install_receiver(
        &self,
        principal: Principal,
        hook: impl TokenReceiver + 'static,
    ) -> Result<(), MintError> {
        self.exclusive()?.install_receiver(principal, Box::new(hook));
        Ok(())
    }

    /// Remove the receiver hook for `principal`. Returns whether one was
    /// installed.
    pub fn remove_receiver(&self, principal: &Principal) -> Result<bool, MintError> {
        Ok(self.exclusive()?.remove_receiver(principal))
    }

    // -- Queries --------------------------------------------------------------

    /// Count of all tokens issued.
    pub fn total_supply(&self) -> Result<u64, MintError> {
        Ok(self.shared()?.total_supply())
    }

    /// Number of tokens owned by `owner`.
    pub fn balance_of(&self, owner: &Principal) -> Result<u64, MintError> {
        Ok(self.shared()?.balance_of(owner))
    }

    /// Owner of `id`.
    pub fn owner_of(&self, id: TokenId) -> Result<Principal, MintError> {
        self.shared()?.owner_of(id)
    }

    /// Whether `id` has been issued.
    pub fn exists(&self, id: TokenId) -> Result<bool, MintError> {
        Ok(self.shared()?.exists(id))
    }

    /// The `index`-th token issued to `owner`.
    pub fn token_of_owner_by_index(&self, owner: &Principal, index: u64) -> Result<TokenId, MintError> {
        self.shared()?.token_of_owner_by_index(owner, index)
    }

    /// The `index`-th token ever issued.
    pub fn token_by_index(&self, index: u64) -> Result<TokenId, MintError> {
        self.shared()?.token_by_index(index)
    }

    /// Tokens owned by `owner`, in issuance order.
    pub fn tokens_of_owner(&self, owner: &Principal) -> Result<Vec<TokenId>, MintError> {
        Ok(self.shared()?.tokens_of_owner(owner).to_vec())
    }

    /// Metadata location of `id`.
    pub fn token_uri(&self, id: TokenId) -> Result<String, MintError> {
        self.shared()?.token_uri(id)
    }

    /// Whether `principal` holds `role`.
    pub fn has_role(&self, principal: &Principal, role: Role) -> Result<bool, MintError> {
        Ok(self.shared()?.has_role(principal, role))
    }

    /// Principals holding `role`.
    pub fn role_members(&self, role: Role) -> Result<Vec<Principal>, MintError> {
        Ok(self.shared()?.role_members(role))
    }

    /// The active allowlist root, if any.
    pub fn merkle_root(&self) -> Result<Option<Root>, MintError> {
        Ok(self.shared()?.merkle_root())
    }

    /// Display name of the collection.
    pub fn name(&self) -> Result<String, MintError> {
        Ok(self.shared()?.name().to_string())
    }

    /// Ticker symbol of the collection.
    pub fn symbol(&self) -> Result<String, MintError> {
        Ok(self.shared()?.symbol().to_string())
    }

    /// Current metadata base URI.
    pub fn base_uri(&self) -> Result<String, MintError> {
        Ok(self.shared()?.base_uri().to_string())
    }

    /// Hash function used for allowlist leaves.
    pub fn hash_algorithm(&self) -> Result<HashAlgorithm, MintError> {
        Ok(self.shared()?.hash_algorithm())
    }

    /// The configured bulk mint policy.
    pub fn bulk_policy(&self) -> Result<BulkMintPolicy, MintError> {
        Ok(self.shared()?.bulk_policy())
    }

    /// Every journaled event.
    pub fn events(&self) -> Result<Vec<EventRecord>, MintError> {
        Ok(self.shared()?.events().to_vec())
    }

    /// Events after sequence number `seq`.
    pub fn events_since(&self, seq: u64) -> Result<Vec<EventRecord>, MintError> {
        Ok(self.shared()?.events_since(seq).to_vec())
    }

    /// Sequence number of the newest event.
    pub fn last_event_seq(&self) -> Result<u64, MintError> {
        Ok(self.shared()?.last_event_seq())
    }
}
