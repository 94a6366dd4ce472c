//! # agora-store
//!
//! The ContentStore abstraction for Agora: an ordered key-value interface
//! with prefix and range scans in lexicographic key order.
//!
//! ## Role in System
//!
//! - **Single persistence seam**: every entity and secondary index of the
//!   engine lives behind the [`ContentStore`] trait
//! - **Ordering is load-bearing**: compound keys are built so that byte
//!   order equals the domain order (post ids, poll end times), which is what
//!   lets callers replace full-table scans with bounded range scans
//!
//! ## Adapters
//!
//! - [`MemoryStore`]: `BTreeMap`-backed, used by unit and integration tests
//! - `RocksStore` (feature `rocksdb`): production adapter with WriteBatch
//!   atomicity and native ordered iterators

pub mod memory;
pub mod ports;

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

pub use memory::MemoryStore;
pub use ports::{prefix_end_bytes, BatchOperation, ContentStore, StoreError};

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksConfig, RocksStore};
