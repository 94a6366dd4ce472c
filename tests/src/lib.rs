//! # Agora Test Suite
//!
//! Unified test crate for cross-component scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs       # End-to-end poll scenarios
//!     ├── lifecycle.rs   # Tick ordering, idempotence, determinism
//!     ├── queries.rs     # Listing, filtering, pagination
//!     └── reactions.rs   # Reaction uniqueness and the registry
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p agora-tests
//! cargo test -p agora-tests integration::lifecycle::
//! ```

#![allow(dead_code)]

pub mod integration;

use agora_engine::{
    AttachmentContent, EngineConfig, Poll, PostEngine, RecordingEventSink, Timestamp,
};
use agora_store::MemoryStore;

pub type TestEngine = PostEngine<MemoryStore, RecordingEventSink>;

/// Fresh engine over an in-memory store with a recording event sink.
pub fn test_engine() -> TestEngine {
    PostEngine::new(
        MemoryStore::new(),
        RecordingEventSink::new(),
        EngineConfig::default(),
    )
}

/// Installs a `RUST_LOG`-driven subscriber once so failing scenarios can be
/// rerun with engine tracing visible.
#[cfg(test)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A poll attachment body with the given answers and deadline.
pub fn poll(answers: &[&str], end_time: Timestamp) -> AttachmentContent {
    AttachmentContent::Poll(Poll {
        question: "which one?".to_owned(),
        provided_answers: answers.iter().map(|s| s.to_string()).collect(),
        end_time,
        allows_multiple_answers: true,
        allows_answer_edits: false,
        is_open: true,
        final_tally: None,
    })
}
