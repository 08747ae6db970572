//! Unified error handling for the client.

use crate::storage::StorageError;
use quotesync_engine::RecordId;

/// Client error type.
///
/// Gateway failures never appear here: transport and parse problems are
/// recovered inside the sync cycle (degraded mode) and surfaced as notices,
/// not errors. What does surface is what the caller can actually act on -
/// storage trouble, contract violations, bad input.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Engine(#[from] quotesync_engine::Error),

    #[error("quote not found: {0}")]
    UnknownRecord(RecordId),

    #[error("invalid quote: {0}")]
    InvalidQuote(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, SyncError>;
