//! Error types for the QuoteSync engine.

use crate::RecordId;
use thiserror::Error;

/// All possible errors from the QuoteSync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("duplicate record id: {0}")]
    DuplicateId(RecordId),

    #[error("conflict queue is empty")]
    EmptyConflictQueue,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
