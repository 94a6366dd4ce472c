//! In-memory ContentStore adapter.
//!
//! Backed by a `BTreeMap`, which keeps keys in lexicographic byte order by
//! construction, so prefix and range scans come out in the same order the
//! production adapter produces them.

use crate::ports::{prefix_end_bytes, BatchOperation, ContentStore, StoreError};
use std::collections::BTreeMap;
use std::ops::Bound;

/// In-memory key-value store for tests and single-process hosts.
#[derive(Default)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ContentStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let upper = prefix_end_bytes(prefix);
        let range = match &upper {
            Some(end) => self.data.range::<[u8], _>((
                Bound::Included(prefix),
                Bound::Excluded(end.as_slice()),
            )),
            // All-0xFF prefix: scan to the end of the keyspace.
            None => self
                .data
                .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded)),
        };
        Ok(range.map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self
            .data
            .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        // Single-threaded map: applying in order is already all-or-nothing.
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }
}
