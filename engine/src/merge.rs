//! Merge logic for reconciling a remote snapshot into the local store.
//!
//! # Algorithm
//!
//! For each remote record, in snapshot order:
//!
//! 1. Unknown id: insert (addition from remote)
//! 2. Known id, remote timestamp <= local: local wins (ties favor local -
//!    local is authoritative on equal stamps)
//! 3. Known id, remote strictly newer, id not locally dirty: remote wins,
//!    record replaced outright
//! 4. Known id, remote strictly newer, id locally dirty: genuine conflict -
//!    queued for the user, store untouched until resolved
//!
//! The dirty-id gate is what elevates bare last-writer-wins into a
//! conflict-aware merge: a strictly newer remote stamp only overwrites
//! records the user has not touched since the last completed cycle.

use crate::{Conflict, ConflictQueue, Quote, QuoteStore, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Counts of what a merge pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Records inserted from the remote snapshot
    pub added: usize,
    /// Records overwritten by a strictly newer, non-conflicting remote copy
    pub updated: usize,
    /// New conflicts appended to the queue
    pub conflicts: usize,
}

impl MergeReport {
    /// Check whether the pass changed nothing and flagged nothing.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.conflicts == 0
    }
}

/// Merge a remote snapshot into the store.
///
/// `dirty_ids` is the set of ids with a local mutation pending at the start
/// of the cycle - drained for push, whether or not the push succeeded.
/// Detected conflicts are appended to `queue` in snapshot order; the store
/// entries they name are left untouched.
///
/// Duplicate ids within one snapshot are processed in order against the
/// evolving store, so id uniqueness holds throughout.
pub fn merge_snapshot(
    store: &mut QuoteStore,
    remote: Vec<Quote>,
    dirty_ids: &HashSet<RecordId>,
    queue: &mut ConflictQueue,
) -> MergeReport {
    let mut report = MergeReport::default();

    for incoming in remote {
        match store.get(&incoming.id) {
            None => {
                store.upsert(incoming);
                report.added += 1;
            }
            Some(local) => {
                if incoming.last_modified <= local.last_modified {
                    continue;
                }
                if dirty_ids.contains(&incoming.id) {
                    queue.push(Conflict {
                        local: local.clone(),
                        server: incoming,
                    });
                    report.conflicts += 1;
                } else {
                    store.upsert(incoming);
                    report.updated += 1;
                }
            }
        }
    }

    report
}
