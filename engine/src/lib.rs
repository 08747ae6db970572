//! # QuoteSync Engine
//!
//! The deterministic core of QuoteSync: a client-side synchronization and
//! conflict-resolution engine for a quote collection.
//!
//! This crate reconciles a local record store against a remote snapshot
//! using a last-writer-wins policy gated by a per-id dirty check, and queues
//! genuine conflicts for explicit user resolution instead of resolving them
//! automatically.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of storage, network, or clocks
//! - **Deterministic**: the same inputs always produce the same outputs
//! - **Testable**: pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Quote`] is `{id, text, category, lastModified}`. Ids are unique
//! within the [`QuoteStore`]; `lastModified` is a millisecond timestamp
//! reflecting the last mutation, local or remote.
//!
//! ### Change Log
//!
//! Local mutations are tracked as [`Change`] entries ([`ChangeKind::Add`] or
//! [`ChangeKind::Update`]) in a [`ChangeLog`] until the remote acknowledges
//! a push. The log drains as a unit and restores as a unit on push failure.
//!
//! ### Merge
//!
//! [`merge_snapshot`] folds a remote snapshot into the store: unknown ids
//! are inserted, ties and older stamps leave the local record alone, and a
//! strictly newer remote stamp either overwrites (clean id) or queues a
//! [`Conflict`] (locally dirty id).
//!
//! ### Conflicts
//!
//! Conflicts wait in a FIFO [`ConflictQueue`] for a user decision;
//! [`resolve_next`] applies a [`Resolution`] to the head entry only.
//!
//! ## Quick Start
//!
//! ```rust
//! use quotesync_engine::{
//!     merge_snapshot, Change, ChangeLog, ConflictQueue, Quote, QuoteStore,
//! };
//!
//! let mut store = QuoteStore::new();
//! store.insert(Quote::new("q-1", "Stay hungry.", "Motivation", 100)).unwrap();
//!
//! let mut changelog = ChangeLog::new();
//! changelog.record(Change::update(store.get("q-1").unwrap().clone()));
//!
//! // A remote snapshot arrives with a newer copy of a locally-dirty record.
//! let remote = vec![Quote::new("q-1", "Stay foolish.", "Motivation", 200)];
//! let dirty = changelog.dirty_ids();
//!
//! let mut conflicts = ConflictQueue::new();
//! let report = merge_snapshot(&mut store, remote, &dirty, &mut conflicts);
//!
//! assert_eq!(report.conflicts, 1);
//! // The store is untouched until the user picks a side.
//! assert_eq!(store.get("q-1").unwrap().text, "Stay hungry.");
//! ```
//!
//! ## Persistence
//!
//! [`QuoteStore`] and [`ChangeLog`] each serialize to a plain JSON array
//! (`to_json` / `from_json`); the embedding layer stores those byte strings
//! wherever it likes.

pub mod change;
pub mod conflict;
pub mod error;
pub mod merge;
pub mod record;
pub mod store;

// Re-export main types at crate root
pub use change::{Change, ChangeKind, ChangeLog};
pub use conflict::{resolve_next, Conflict, ConflictQueue, Resolution};
pub use error::{Error, Result};
pub use merge::{merge_snapshot, MergeReport};
pub use record::{Quote, FALLBACK_CATEGORY};
pub use store::QuoteStore;

/// Type aliases for clarity
pub type RecordId = String;
pub type Timestamp = u64;
