//! # ContentStore Port
//!
//! The ordered key-value interface required by the engine, together with the
//! batch-write operation type and the error surface of the storage layer.
//!
//! Implementations must keep keys in lexicographic byte order for both
//! `prefix_scan` and `range_scan`; everything above this trait relies on it.

use thiserror::Error;

/// Errors surfaced by a [`ContentStore`] implementation.
///
/// A store error means the store itself is unusable for the current atomic
/// unit; callers are expected to abort the operation they are driving.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("corrupted value under key {key_hex}: {reason}")]
    CorruptedValue { key_hex: String, reason: String },
}

/// A single operation inside an atomic batch write.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Durable ordered key-value storage.
///
/// All methods operate within the host's current atomic unit: the engine is
/// single-writer per logical time step, so implementations do not need to
/// provide isolation between concurrent mutators, only durability and order.
pub trait ContentStore: Send {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Set a single key-value pair, overwriting any previous value.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Check whether a key exists.
    fn has(&self, key: &[u8]) -> Result<bool, StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// All entries with `start <= key < end`, in ascending key order.
    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Execute an atomic batch write: either every operation is applied or
    /// none are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StoreError>;
}

/// Smallest byte string strictly greater than every key carrying `prefix`.
///
/// Increments the last non-0xFF byte and truncates the rest; a prefix of all
/// 0xFF bytes has no upper bound and yields `None`. Used to turn a key
/// prefix into the exclusive end bound of a `range_scan`.
pub fn prefix_end_bytes(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return Some(end);
        }
        end.pop();
    }
    None
}
