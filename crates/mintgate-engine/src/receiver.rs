//! # Token Receiver Hooks
//!
//! A principal may have a [`TokenReceiver`] installed, standing in for
//! code that runs at that address when it is sent a token. The hook runs
//! after the token is recorded, inside the same critical section, and acts
//! with the receiving principal's own authority: it can change roles only
//! if the receiver is itself an administrator.
//!
//! This is the one way state can change in the middle of a bulk mint, and
//! so the one way the two [`BulkMintPolicy`](crate::BulkMintPolicy)
//! variants can diverge.
//!
//! ## Reentry
//!
//! The engine's write lock is held while a hook runs, so a hook must not
//! call back into the [`Engine`](crate::Engine) that is running it. Every
//! such call fails fast with [`MintError::Reentrant`] instead of taking the
//! lock. Everything a hook may see or change is on [`ReceiverContext`].

use std::cell::RefCell;

use mintgate_core::{MintError, Principal, Role, TokenId};
use mintgate_state::{AccessRegistry, TokenLedger};

use crate::event::{EngineEvent, EventLog};

/// Callback invoked after a token is issued to the principal it is
/// installed for.
///
/// Hooks read and act through the [`ReceiverContext`] they are given.
/// Calls on an [`Engine`](crate::Engine) handle captured by the hook
/// return [`MintError::Reentrant`] while the hook runs.
pub trait TokenReceiver: Send + Sync {
    /// Called once per received token.
    fn on_token_received(&mut self, ctx: &mut ReceiverContext<'_>, token_id: TokenId);
}

impl<F> TokenReceiver for F
where
    F: FnMut(&mut ReceiverContext<'_>, TokenId) + Send + Sync,
{
    fn on_token_received(&mut self, ctx: &mut ReceiverContext<'_>, token_id: TokenId) {
        self(ctx, token_id)
    }
}

/// What a receiver hook may do, acting as the receiving principal.
pub struct ReceiverContext<'a> {
    principal: Principal,
    registry: &'a mut AccessRegistry,
    ledger: &'a TokenLedger,
    events: &'a mut EventLog,
}

impl<'a> ReceiverContext<'a> {
    pub(crate) fn new(
        principal: Principal,
        registry: &'a mut AccessRegistry,
        ledger: &'a TokenLedger,
        events: &'a mut EventLog,
    ) -> Self {
        Self {
            principal,
            registry,
            ledger,
            events,
        }
    }

    /// The principal the hook is running as.
    pub fn principal(&self) -> Principal {
        self.principal
    }

    /// Whether `principal` holds `role`.
    pub fn has_role(&self, principal: &Principal, role: Role) -> bool {
        self.registry.has_role(principal, role)
    }

    /// Number of tokens owned by `owner`, including the one just received.
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

    /// Count of all tokens issued so far.
    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Grant `role` to `target` as the receiving principal.
    pub fn grant_role(&mut self, role: Role, target: Principal) -> Result<bool, MintError> {
        grant(self.registry, self.events, &self.principal, role, target)
    }

    /// Revoke `role` from `target` as the receiving principal.
    pub fn revoke_role(&mut self, role: Role, target: &Principal) -> Result<bool, MintError> {
        revoke(self.registry, self.events, &self.principal, role, target)
    }
}

// -- Hook scope ---------------------------------------------------------------

thread_local! {
    /// Controllers with a hook running on this thread, innermost last.
    static RUNNING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Marks a controller's hook as running on the current thread until
/// dropped, unwinding included.
pub(crate) struct HookScope {
    instance: u64,
}

impl HookScope {
    pub(crate) fn enter(instance: u64) -> Self {
        RUNNING.with(|running| running.borrow_mut().push(instance));
        Self { instance }
    }
}

impl Drop for HookScope {
    fn drop(&mut self) {
        RUNNING.with(|running| {
            let mut running = running.borrow_mut();
            if let Some(pos) = running.iter().rposition(|i| *i == self.instance) {
                running.remove(pos);
            }
        });
    }
}

/// Whether a hook of controller `instance` is running on this thread.
pub(crate) fn hook_running(instance: u64) -> bool {
    RUNNING.with(|running| running.borrow().contains(&instance))
}

// Shared by the controller and receiver hooks so both journal identically.

pub(crate) fn grant(
    registry: &mut AccessRegistry,
    events: &mut EventLog,
    caller: &Principal,
    role: Role,
    target: Principal,
) -> Result<bool, MintError> {
    let added = registry.grant(caller, role, target)?;
    if added {
        events.push(EngineEvent::RoleGranted {
            role,
            account: target,
            sender: *caller,
        });
    }
    Ok(added)
}

pub(crate) fn revoke(
    registry: &mut AccessRegistry,
    events: &mut EventLog,
    caller: &Principal,
    role: Role,
    target: &Principal,
) -> Result<bool, MintError> {
    let removed = registry.revoke(caller, role, target)?;
    if removed {
        events.push(EngineEvent::RoleRevoked {
            role,
            account: *target,
            sender: *caller,
        });
    }
    Ok(removed)
}
