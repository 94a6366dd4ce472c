//! # Post Engine Service
//!
//! The single service implementing every operation of the engine over
//! injected ports: a [`ContentStore`] for persistence and an [`EventSink`]
//! for observability.
//!
//! ## Atomicity model
//!
//! Execution is single-threaded and cooperative. Every operation validates
//! completely before its first write; multi-row writes go through the
//! store's atomic batch. On any returned error no partial state change has
//! occurred (a [`StoreError`](agora_store::StoreError) means the store
//! itself is unusable).

pub mod invariants;
pub mod lifecycle;
pub mod polls;
pub mod posts;
pub mod query;

use crate::domain::entities::EngineConfig;
use crate::domain::errors::EngineError;
use crate::events::EventSink;
use agora_store::{ContentStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The content engine: post repository, poll lifecycle, query engine, and
/// invariant checker in one service.
pub struct PostEngine<S: ContentStore, E: EventSink> {
    store: S,
    events: E,
    config: EngineConfig,
}

impl<S: ContentStore, E: EventSink> PostEngine<S, E> {
    pub fn new(store: S, events: E, config: EngineConfig) -> Self {
        Self {
            store,
            events,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The event sink, for hosts and tests that need to inspect emissions.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Tear the engine apart into its ports.
    pub fn into_parts(self) -> (S, E) {
        (self.store, self.events)
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub(crate) fn emit(&mut self, event: crate::events::Event) {
        self.events.emit(event);
    }

    /// Serialize an entity into its store value.
    pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, EngineError> {
        bincode::serialize(value).map_err(|e| {
            EngineError::Store(StoreError::Database(format!("encode failed: {e}")))
        })
    }

    /// Decode a store value; a failure means the row is corrupt, which is a
    /// storage-layer fault, not a caller error.
    pub(crate) fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, EngineError> {
        bincode::deserialize(bytes).map_err(|e| {
            EngineError::Store(StoreError::CorruptedValue {
                key_hex: hex::encode(key),
                reason: e.to_string(),
            })
        })
    }

    /// Read and decode an entity, `None` when the key is absent.
    pub(crate) fn get_entity<T: DeserializeOwned>(
        &self,
        key: &[u8],
    ) -> Result<Option<T>, EngineError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(Self::decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Encode and write an entity under `key`.
    pub(crate) fn put_entity<T: Serialize>(
        &mut self,
        key: &[u8],
        value: &T,
    ) -> Result<(), EngineError> {
        let bytes = Self::encode(value)?;
        self.store.set(key, &bytes)?;
        Ok(())
    }
}
