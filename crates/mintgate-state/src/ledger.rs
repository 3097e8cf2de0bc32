//! # Token Ledger
//!
//! Authoritative record of which principal owns which token.
//!
//! ## Invariants
//!
//! - Identifiers are assigned `1, 2, 3, ...` with no gaps and are never
//!   reused. There is no burn path, so `total_supply` equals the highest
//!   issued identifier.
//! - Each owner's sequence lists exactly the tokens it owns, in the order
//!   they were issued to it. The sequences partition `1..=total_supply`.

use std::collections::HashMap;

use mintgate_core::{MintError, Principal, TokenId};

/// Ownership ledger with per-owner enumeration.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    /// Owner of token `i + 1` at position `i`.
    owners: Vec<Principal>,
    /// Tokens held by each owner, in issuance order.
    holdings: HashMap<Principal, Vec<TokenId>>,
}

impl TokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identifier to `owner`.
    ///
    /// Fails with [`MintError::MalformedInput`] for the zero address, and
    /// with [`MintError::SupplyExhausted`] if the identifier space is used up.
    pub fn issue(&mut self, owner: Principal) -> Result<TokenId, MintError> {
        let owner = owner.require_nonzero()?;
        let id = self
            .last_issued()
            .map_or(Some(TokenId::FIRST), |last| last.checked_next())
            .ok_or(MintError::SupplyExhausted)?;

        self.owners.push(owner);
        self.holdings.entry(owner).or_default().push(id);
        tracing::debug!(token_id = id.get(), owner = %owner, "token issued");
        Ok(id)
    }

    /// The current owner of `id`.
    pub fn owner_of(&self, id: TokenId) -> Result<Principal, MintError> {
        Self::position(id)
            .and_then(|i| self.owners.get(i))
            .copied()
            .ok_or(MintError::NotFound(id))
    }

    /// Whether `id` has been issued.
    pub fn exists(&self, id: TokenId) -> bool {
        self.owner_of(id).is_ok()
    }

    /// Number of tokens owned by `owner`. Zero for unknown owners.
    pub fn balance_of(&self, owner: &Principal) -> u64 {
        self.tokens_of_owner(owner).len() as u64
    }

    /// The `index`-th token issued to `owner`.
    pub fn token_of_owner_by_index(
        &self,
        owner: &Principal,
        index: u64,
    ) -> Result<TokenId, MintError> {
        let tokens = self.tokens_of_owner(owner);
        usize::try_from(index)
            .ok()
            .and_then(|i| tokens.get(i))
            .copied()
            .ok_or(MintError::IndexOutOfRange {
                index,
                len: tokens.len() as u64,
            })
    }

    /// The `index`-th token ever issued.
    pub fn token_by_index(&self, index: u64) -> Result<TokenId, MintError> {
        if index < self.total_supply() {
            Ok(TokenId(index + 1))
        } else {
            Err(MintError::IndexOutOfRange {
                index,
                len: self.total_supply(),
            })
        }
    }

    /// All tokens owned by `owner`, in issuance order.
    pub fn tokens_of_owner(&self, owner: &Principal) -> &[TokenId] {
        self.holdings.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Count of all tokens ever issued.
    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    /// The most recently issued identifier.
    pub fn last_issued(&self) -> Option<TokenId> {
        match self.total_supply() {
            0 => None,
            n => Some(TokenId(n)),
        }
    }

    fn position(id: TokenId) -> Option<usize> {
        id.get()
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
    }
}
