//! # Engine Events
//!
//! Fire-and-forget observability callbacks. Every successful mutation emits
//! one event through the host-supplied [`EventSink`]; the engine never reads
//! them back, so sinks may drop, buffer, or forward at will.

use crate::domain::entities::{AttachmentId, PostId, TenantId, Timestamp};

/// Kind of a state change worth observing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    PostCreated,
    PostEdited,
    AttachmentAdded,
    PollAnswered,
    PollClosed,
    ReactionAdded,
    ReactionRemoved,
    ReactionRegistered,
}

/// An emitted event: a kind plus free-form string attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn tenant(self, tenant: TenantId) -> Self {
        self.attr("tenant", tenant.0)
    }

    pub fn post(self, post_id: PostId) -> Self {
        self.attr("post_id", post_id.0)
    }

    pub fn poll(self, poll_id: AttachmentId) -> Self {
        self.attr("poll_id", poll_id.0)
    }

    pub fn at(self, now: Timestamp) -> Self {
        self.attr("time", now.0)
    }
}

/// Outbound port for event emission.
pub trait EventSink: Send {
    fn emit(&mut self, event: Event);
}

/// Sink that discards everything.
#[derive(Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: Event) {}
}

/// Sink that records every event, for assertions in tests.
#[derive(Default)]
pub struct RecordingEventSink {
    pub events: Vec<Event>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events of the given kind, in emission order.
    pub fn of_kind(&self, kind: EventKind) -> Vec<&Event> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
