//! # Event Journal
//!
//! Append-only record of every committed state change, numbered from 1.
//! Failed calls and no-op role changes leave no entry.

use serde::{Deserialize, Serialize};

use mintgate_core::{Principal, Role, Root, TokenId};

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A token moved between principals. Issuance has `from` = zero address.
    Transfer {
        from: Principal,
        to: Principal,
        token_id: TokenId,
    },
    /// `account` received `role` from `sender`.
    RoleGranted {
        role: Role,
        account: Principal,
        sender: Principal,
    },
    /// `account` lost `role`; `sender` is the revoker, or `account` itself
    /// when renounced.
    RoleRevoked {
        role: Role,
        account: Principal,
        sender: Principal,
    },
    /// The allowlist root was replaced.
    MerkleRootUpdated {
        previous: Option<Root>,
        current: Root,
    },
    /// The metadata base URI was replaced.
    BaseUriUpdated { base_uri: String },
}

/// An event with its position in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based sequence number.
    pub seq: u64,
    /// The event.
    pub event: EngineEvent,
}

/// Ordered event journal.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn push(&mut self, event: EngineEvent) -> u64 {
        let seq = self.records.len() as u64 + 1;
        self.records.push(EventRecord { seq, event });
        seq
    }

    /// All records, oldest first.
    pub fn all(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number greater than `seq`.
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq <= seq);
        &self.records[start..]
    }

    /// Sequence number of the newest record, zero when empty.
    pub fn last_seq(&self) -> u64 {
        self.records.len() as u64
    }
}
