//! # agora-engine
//!
//! Deterministic multi-tenant content engine for Agora.
//!
//! ## Role in System
//!
//! - **Post repository**: posts, media/poll attachments, and reactions over
//!   the ordered [`ContentStore`](agora_store::ContentStore), with per-tenant
//!   monotonic id counters
//! - **Poll lifecycle**: a time-ordered active-poll queue plus an idempotent
//!   tally engine, driven exclusively through [`PostEngine::tick`]
//! - **Read side**: filtered, paginated post listing and batch cross-entity
//!   invariant checks
//!
//! ## Determinism
//!
//! The engine never reads a clock and performs no background work. Every
//! notion of "now" is an argument supplied by the host, so replaying the
//! same command sequence always produces bit-identical store contents.

pub mod domain;
pub mod events;
pub mod service;

pub use domain::entities::{
    AnswerResult, Attachment, AttachmentContent, AttachmentId, EngineConfig, Poll, Post, PostId,
    Reaction, RegisteredReaction, TallyResults, TenantId, Timestamp, UserAnswer,
};
pub use domain::errors::EngineError;
pub use events::{Event, EventKind, EventSink, NullEventSink, RecordingEventSink};
pub use service::invariants::InvariantReport;
pub use service::query::{PageRequest, PostFilter, SortOrder};
pub use service::PostEngine;
