//! Sync service - orchestration of push, fetch, merge, and resolution.
//!
//! [`SyncService`] owns the whole client-side state: record store, change
//! log, conflict queue, persistence slots, gateway, clock, and event bus.
//! The embedding UI is a thin caller that turns user events into these
//! methods and the returned reports/events into renders.
//!
//! A cycle is single-threaded with cooperative suspension at the two
//! gateway calls; the embedder must serialize cycles (see
//! [`crate::scheduler`]).

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, SyncError};
use crate::event::{EventBus, Severity};
use crate::gateway::{GatewayError, RemoteGateway};
use crate::storage::{StateStore, CHANGELOG_SLOT, QUOTES_SLOT};
use quotesync_engine::{
    merge_snapshot, Change, ChangeLog, Conflict, ConflictQueue, Error as EngineError, MergeReport,
    Quote, QuoteStore, RecordId, Resolution, FALLBACK_CATEGORY,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// What happened to the change log during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PushStatus {
    /// The log was empty, nothing to push
    Nothing,
    /// The remote acknowledged the batch; the log is clear
    Pushed(usize),
    /// The push failed; the batch is back in the log for the next cycle
    Deferred(usize),
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Push half of the cycle
    pub push: PushStatus,
    /// Merge half; `None` means nothing to merge (fetch failed or empty)
    pub merge: Option<MergeReport>,
}

impl SyncReport {
    /// Conflicts newly queued by this cycle.
    pub fn new_conflicts(&self) -> usize {
        self.merge.map(|m| m.conflicts).unwrap_or(0)
    }
}

/// The client-side sync engine.
pub struct SyncService<S: StateStore, G: RemoteGateway> {
    store: QuoteStore,
    changelog: ChangeLog,
    conflicts: ConflictQueue,
    storage: S,
    gateway: G,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl<S: StateStore, G: RemoteGateway> SyncService<S, G> {
    /// Load state from the persistence slots, using the system clock.
    pub fn load(storage: S, gateway: G, events: EventBus) -> Result<Self> {
        Self::load_with_clock(storage, gateway, events, Arc::new(SystemClock))
    }

    /// Load state from the persistence slots with an explicit clock.
    pub fn load_with_clock(
        storage: S,
        gateway: G,
        events: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let store = match storage.read(QUOTES_SLOT)? {
            Some(bytes) => QuoteStore::from_json(&decode_slot(bytes)?)?,
            None => QuoteStore::new(),
        };
        let changelog = match storage.read(CHANGELOG_SLOT)? {
            Some(bytes) => ChangeLog::from_json(&decode_slot(bytes)?)?,
            None => ChangeLog::new(),
        };

        tracing::debug!(
            "loaded {} quote(s), {} pending change(s)",
            store.len(),
            changelog.len()
        );

        Ok(Self {
            store,
            changelog,
            conflicts: ConflictQueue::new(),
            storage,
            gateway,
            clock,
            events,
        })
    }

    /// The record store.
    pub fn quotes(&self) -> &QuoteStore {
        &self.store
    }

    /// Distinct categories in the collection (dropdown fodder).
    pub fn categories(&self) -> Vec<&str> {
        self.store.categories()
    }

    /// The pending change log.
    pub fn pending_changes(&self) -> &ChangeLog {
        &self.changelog
    }

    /// The unresolved conflict queue.
    pub fn conflicts(&self) -> &ConflictQueue {
        &self.conflicts
    }

    /// The conflict the UI should be presenting, if any.
    pub fn peek_conflict(&self) -> Option<&Conflict> {
        self.conflicts.peek()
    }

    /// Populate the store with a default collection on first run.
    ///
    /// Seeds create no change entries; they are baseline data, not local
    /// edits awaiting a push. Does nothing if the store already has records.
    pub fn seed_if_empty(&mut self, records: Vec<Quote>) -> Result<usize> {
        if !self.store.is_empty() {
            return Ok(0);
        }
        let count = records.len();
        for record in records {
            self.store.insert(record)?;
        }
        self.persist_store()?;
        Ok(count)
    }

    /// Add a quote entered locally.
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<Quote> {
        let (text, category) = validate_input(text, category)?;

        let quote = Quote::new(
            uuid::Uuid::new_v4().to_string(),
            text,
            category,
            self.clock.now_ms(),
        );
        self.store.insert(quote.clone())?;
        self.changelog.record(Change::add(quote.clone()));

        self.persist_store()?;
        self.persist_changelog()?;
        Ok(quote)
    }

    /// Apply a local edit to an existing quote.
    pub fn update_quote(&mut self, id: &str, text: &str, category: &str) -> Result<Quote> {
        let (text, category) = validate_input(text, category)?;

        let now = self.clock.now_ms();
        let record = self
            .store
            .get_mut(id)
            .ok_or_else(|| SyncError::UnknownRecord(id.to_string()))?;
        record.text = text;
        record.category = category;
        record.touch(now);
        let updated = record.clone();

        self.changelog.record(Change::update(updated.clone()));

        self.persist_store()?;
        self.persist_changelog()?;
        Ok(updated)
    }

    /// Import a JSON array of quotes.
    ///
    /// Entries are normalized like a remote snapshot, except that ids are
    /// minted when missing and unstamped entries get the current time.
    /// Imports create records but no change entries; entries whose id is
    /// already present are skipped, as are unusable ones. Returns how many
    /// records were imported.
    pub fn import_quotes(&mut self, json: &str) -> Result<usize> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| EngineError::MalformedPayload(e.to_string()))?;

        let now = self.clock.now_ms();
        let mut imported = 0;
        let mut skipped = 0;
        for value in &values {
            match normalize_import(value, now) {
                Some(quote) if !self.store.contains(&quote.id) => {
                    self.store.insert(quote)?;
                    imported += 1;
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!("import skipped {} unusable or duplicate entries", skipped);
        }
        self.persist_store()?;
        self.events
            .notice(Severity::Success, format!("Imported {imported} quote(s)"));
        Ok(imported)
    }

    /// Export the collection as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(self.store.to_json_pretty()?)
    }

    /// Run one synchronization cycle: push pending changes, fetch the
    /// remote snapshot, merge, queue conflicts.
    ///
    /// Gateway failures degrade the cycle (push deferred, merge skipped) and
    /// surface as notices; only storage or state corruption becomes `Err`.
    pub async fn sync_cycle(&mut self) -> Result<SyncReport> {
        // The drained batch doubles as the cycle's dirty-id set: these are
        // the records mutated locally since the last completed cycle,
        // whether or not the push below succeeds.
        let drained = self.changelog.drain();
        let dirty_ids: HashSet<RecordId> =
            drained.iter().map(|c| c.record_id().clone()).collect();

        let push = if drained.is_empty() {
            PushStatus::Nothing
        } else {
            match self.gateway.push(&drained).await {
                Ok(()) => {
                    tracing::info!("pushed {} pending change(s)", drained.len());
                    PushStatus::Pushed(drained.len())
                }
                Err(err) => {
                    tracing::warn!("push failed, retaining pending changes: {}", err);
                    self.events.notice(
                        Severity::Warning,
                        "Could not push local changes; they will be retried",
                    );
                    let count = drained.len();
                    self.changelog.restore(drained);
                    PushStatus::Deferred(count)
                }
            }
        };
        self.persist_changelog()?;

        let snapshot = match self.gateway.fetch_snapshot().await {
            Ok(values) => values,
            Err(GatewayError::Transport(msg)) => {
                tracing::warn!("fetch failed, skipping merge: {}", msg);
                self.events.notice(
                    Severity::Warning,
                    "Could not reach the server; local quotes are unchanged",
                );
                return Ok(SyncReport { push, merge: None });
            }
            Err(GatewayError::Parse(msg)) => {
                // Malformed payload is treated as an empty snapshot
                tracing::warn!("unreadable remote snapshot, skipping merge: {}", msg);
                self.events.notice(
                    Severity::Warning,
                    "Server snapshot was unreadable; local quotes are unchanged",
                );
                return Ok(SyncReport { push, merge: None });
            }
        };

        if snapshot.is_empty() {
            tracing::debug!("remote snapshot empty, nothing to merge");
            return Ok(SyncReport { push, merge: None });
        }

        let mut malformed = 0;
        let remote: Vec<Quote> = snapshot
            .iter()
            .filter_map(|value| {
                let quote = Quote::from_value(value);
                if quote.is_none() {
                    malformed += 1;
                }
                quote
            })
            .collect();
        if malformed > 0 {
            tracing::warn!("dropped {} malformed remote entries", malformed);
        }

        let presenting_already = !self.conflicts.is_empty();
        let report = merge_snapshot(&mut self.store, remote, &dirty_ids, &mut self.conflicts);
        self.persist_store()?;

        if report.conflicts > 0 {
            self.events.notice(
                Severity::Warning,
                format!("{} quote(s) need manual conflict resolution", report.conflicts),
            );
            if !presenting_already {
                if let Some(head) = self.conflicts.peek() {
                    self.events.conflict_pending(head);
                }
            }
        } else if report.added > 0 || report.updated > 0 {
            self.events
                .notice(Severity::Success, "Quotes synced with server");
        } else {
            self.events.notice(Severity::Info, "Already up to date");
        }

        tracing::info!(
            "sync cycle finished: {} added, {} updated, {} new conflict(s)",
            report.added,
            report.updated,
            report.conflicts
        );
        Ok(SyncReport {
            push,
            merge: Some(report),
        })
    }

    /// Resolve the head conflict with the user's choice.
    ///
    /// Returns whether the queue is now empty (the UI can stop prompting).
    /// Calling with an empty queue is a contract violation and surfaces as
    /// an error without touching any state.
    pub fn resolve_next(&mut self, choice: Resolution) -> Result<bool> {
        let empty = quotesync_engine::resolve_next(
            &mut self.store,
            &mut self.changelog,
            &mut self.conflicts,
            choice,
        )?;
        self.persist_store()?;
        self.persist_changelog()?;

        self.events.notice(Severity::Success, "Conflict resolved");
        if let Some(next) = self.conflicts.peek() {
            self.events.conflict_pending(next);
        }
        Ok(empty)
    }

    fn persist_store(&self) -> Result<()> {
        let json = self.store.to_json()?;
        self.storage.write(QUOTES_SLOT, json.as_bytes())?;
        Ok(())
    }

    fn persist_changelog(&self) -> Result<()> {
        let json = self.changelog.to_json()?;
        self.storage.write(CHANGELOG_SLOT, json.as_bytes())?;
        Ok(())
    }
}

fn decode_slot(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| SyncError::Engine(EngineError::MalformedPayload(e.to_string())))
}

fn validate_input(text: &str, category: &str) -> Result<(String, String)> {
    let text = text.trim();
    let category = category.trim();
    if text.is_empty() {
        return Err(SyncError::InvalidQuote("text is required".into()));
    }
    if category.is_empty() {
        return Err(SyncError::InvalidQuote("category is required".into()));
    }
    Ok((text.to_string(), category.to_string()))
}

/// Import-flavored normalization: mint ids that are missing, stamp entries
/// that carry no timestamp with the import time.
fn normalize_import(value: &serde_json::Value, now: u64) -> Option<Quote> {
    let obj = value.as_object()?;

    let text = obj.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let id = match obj.get("id") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    };

    let category = obj
        .get("category")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_CATEGORY)
        .to_string();

    let last_modified = obj.get("lastModified").and_then(|v| v.as_u64()).unwrap_or(now);

    Some(Quote::new(id, text, category, last_modified))
}
