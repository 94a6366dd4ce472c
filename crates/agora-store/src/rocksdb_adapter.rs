//! RocksDB ContentStore adapter.
//!
//! Production adapter: RocksDB keeps keys in lexicographic order natively,
//! so prefix and range scans map onto forward iterators with an early stop.
//! Batch writes use `WriteBatch` for all-or-nothing application.

use crate::ports::{prefix_end_bytes, BatchOperation, ContentStore, StoreError};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

/// RocksDB tuning knobs.
#[derive(Debug, Clone)]
pub struct RocksConfig {
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Enable fsync after each write.
    pub sync_writes: bool,
}

impl Default for RocksConfig {
    fn default() -> Self {
        Self {
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            sync_writes: true,
        }
    }
}

impl RocksConfig {
    /// Config for tests: small buffers, no fsync.
    pub fn for_testing() -> Self {
        Self {
            write_buffer_size: 4 * 1024 * 1024, // 4MB
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a database at `path`.
    pub fn open(path: impl AsRef<Path>, config: RocksConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
        opts.set_use_fsync(config.sync_writes);

        let db = DB::open(&opts, path).map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(Self { db })
    }

    fn scan_from(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut out = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(start, Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if let Some(end) = end {
                if key.as_ref() >= end {
                    break;
                }
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}

impl ContentStore for RocksStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .get(key)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db
            .put(key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.db
            .delete(key)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let end = prefix_end_bytes(prefix);
        self.scan_from(prefix, end.as_deref())
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        if start >= end {
            return Ok(Vec::new());
        }
        self.scan_from(start, Some(end))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(key, value),
                BatchOperation::Delete { key } => batch.delete(key),
            }
        }
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
