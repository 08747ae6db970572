//! Persistence contract - two named byte-string slots.
//!
//! The engine's state lives in exactly two slots: the serialized quote
//! collection and the serialized change log, both UTF-8 JSON arrays. They
//! are read once at startup and written after every mutating operation.
//! The key-value store behind the slots is the embedder's concern; this
//! module only defines the contract and ships an in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Slot holding the serialized quote collection.
pub const QUOTES_SLOT: &str = "quotes";

/// Slot holding the serialized change log.
pub const CHANGELOG_SLOT: &str = "pending_changes";

/// Storage failure.
#[derive(Debug, thiserror::Error)]
#[error("storage slot '{slot}': {message}")]
pub struct StorageError {
    /// Slot the operation targeted
    pub slot: String,
    /// What went wrong
    pub message: String,
}

impl StorageError {
    /// Create a storage error for a slot.
    pub fn new(slot: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            message: message.into(),
        }
    }
}

/// A named-slot byte store.
pub trait StateStore: Send + Sync {
    /// Read a slot. `None` means the slot has never been written.
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write a slot, replacing any previous contents.
    fn write(&self, slot: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).read(slot)
    }

    fn write(&self, slot: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write(slot, bytes)
    }
}

impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).read(slot)
    }

    fn write(&self, slot: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write(slot, bytes)
    }
}

/// In-memory slot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StorageError::new(slot, "poisoned lock"))?;
        Ok(slots.get(slot).cloned())
    }

    fn write(&self, slot: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StorageError::new(slot, "poisoned lock"))?;
        slots.insert(slot.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_slot_reads_none() {
        let store = MemoryStore::new();
        assert!(store.read(QUOTES_SLOT).unwrap().is_none());
    }

    #[test]
    fn write_then_read_roundtrip() {
        let store = MemoryStore::new();
        store.write(QUOTES_SLOT, b"[]").unwrap();
        assert_eq!(store.read(QUOTES_SLOT).unwrap().unwrap(), b"[]");
    }

    #[test]
    fn slots_are_independent() {
        let store = MemoryStore::new();
        store.write(QUOTES_SLOT, b"[1]").unwrap();
        store.write(CHANGELOG_SLOT, b"[2]").unwrap();

        assert_eq!(store.read(QUOTES_SLOT).unwrap().unwrap(), b"[1]");
        assert_eq!(store.read(CHANGELOG_SLOT).unwrap().unwrap(), b"[2]");
    }

    #[test]
    fn write_replaces_previous_contents() {
        let store = MemoryStore::new();
        store.write(QUOTES_SLOT, b"old").unwrap();
        store.write(QUOTES_SLOT, b"new").unwrap();
        assert_eq!(store.read(QUOTES_SLOT).unwrap().unwrap(), b"new");
    }
}
