//! Change log - local mutations awaiting remote acknowledgment.
//!
//! Every local add or update lands here before it is pushed. The log is
//! drained as a unit at the start of a sync cycle and, if the push fails,
//! restored as a unit so no pending work is lost.

use crate::{Quote, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What kind of local mutation a change entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Record created locally, never seen by the remote
    Add,
    /// Existing record mutated locally
    Update,
}

/// A local mutation not yet confirmed pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Kind of mutation
    pub kind: ChangeKind,
    /// The record as it stood after the mutation
    pub record: Quote,
}

impl Change {
    /// Create an Add entry.
    pub fn add(record: Quote) -> Self {
        Self {
            kind: ChangeKind::Add,
            record,
        }
    }

    /// Create an Update entry.
    pub fn update(record: Quote) -> Self {
        Self {
            kind: ChangeKind::Update,
            record,
        }
    }

    /// Id of the record this change applies to.
    pub fn record_id(&self) -> &RecordId {
        &self.record.id
    }
}

/// Ordered list of pending local mutations.
///
/// Serializes as a JSON array of `{kind, record}` entries, which is both the
/// persistence slot format and the push wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<Change>,
}

impl ChangeLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change entry, coalescing per id.
    ///
    /// At most one entry applies per id at push time. A mutation of a record
    /// with a pending entry replaces that entry in place; an Update recorded
    /// over a pending Add stays an Add carrying the newer record, since the
    /// remote has never seen the id.
    pub fn record(&mut self, change: Change) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.record_id() == change.record_id())
        {
            Some(existing) => {
                if existing.kind == ChangeKind::Add {
                    existing.record = change.record;
                } else {
                    *existing = change;
                }
            }
            None => self.entries.push(change),
        }
    }

    /// Return the full ordered list and clear the log.
    pub fn drain(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.entries)
    }

    /// Re-insert a drained batch after a failed push.
    ///
    /// The batch goes ahead of anything recorded since the drain so the wire
    /// order stays chronological on the next attempt.
    pub fn restore(&mut self, mut batch: Vec<Change>) {
        batch.append(&mut self.entries);
        self.entries = batch;
    }

    /// Remove every entry naming `id`. Returns how many were removed.
    pub fn discard_for(&mut self, id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.record_id() != id);
        before - self.entries.len()
    }

    /// Ids with a pending entry.
    pub fn dirty_ids(&self) -> HashSet<RecordId> {
        self.entries.iter().map(|e| e.record_id().clone()).collect()
    }

    /// Check whether an entry for `id` is pending.
    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.record_id() == id)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pending entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.entries.iter()
    }

    /// Serialize to the persistence wire format (JSON array).
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::MalformedPayload(e.to_string()))
    }

    /// Deserialize from the persistence wire format.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::MalformedPayload(e.to_string()))
    }
}
