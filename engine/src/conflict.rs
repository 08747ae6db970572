//! Conflict queue and resolution.
//!
//! A conflict is a record pair with the same id where both sides were
//! modified since the last completed sync. Conflicts are never resolved
//! automatically; they queue up for an explicit user decision, strictly in
//! arrival order, one at a time.

use crate::{error::Result, ChangeLog, Error, Quote, QuoteStore, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A detected conflict between a local record and its remote counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// The local record at detection time
    pub local: Quote,
    /// The remote record that would have overwritten it
    pub server: Quote,
}

impl Conflict {
    /// Id the conflicting pair shares.
    pub fn record_id(&self) -> &RecordId {
        &self.local.id
    }

    /// Consume the conflict, keeping the chosen side.
    pub fn into_winner(self, choice: Resolution) -> Quote {
        match choice {
            Resolution::Local => self.local,
            Resolution::Server => self.server,
        }
    }
}

/// Which side of a conflict to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Local,
    Server,
}

/// FIFO backlog of unresolved conflicts awaiting a user decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictQueue {
    entries: VecDeque<Conflict>,
}

impl ConflictQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a conflict at the back.
    pub fn push(&mut self, conflict: Conflict) {
        self.entries.push_back(conflict);
    }

    /// The head conflict, if any - what the UI should be presenting.
    pub fn peek(&self) -> Option<&Conflict> {
        self.entries.front()
    }

    /// Remove and return the head conflict.
    pub fn pop(&mut self) -> Option<Conflict> {
        self.entries.pop_front()
    }

    /// Number of unresolved conflicts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no conflicts are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate conflicts in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.entries.iter()
    }
}

/// Resolve the head conflict with the caller's choice.
///
/// The chosen record becomes the authoritative state for its id: it is
/// written into the store (insert or overwrite) and any pending change log
/// entries for that id are discarded, superseded by the resolution. Other
/// queued conflicts - including ones naming the same id - are untouched;
/// each must be processed explicitly.
///
/// Returns whether the queue is now empty, signalling the caller to stop
/// prompting. Calling with an empty queue is a contract violation and
/// mutates nothing.
pub fn resolve_next(
    store: &mut QuoteStore,
    changelog: &mut ChangeLog,
    queue: &mut ConflictQueue,
    choice: Resolution,
) -> Result<bool> {
    let conflict = queue.pop().ok_or(Error::EmptyConflictQueue)?;
    let winner = conflict.into_winner(choice);
    changelog.discard_for(&winner.id);
    store.upsert(winner);
    Ok(queue.is_empty())
}
