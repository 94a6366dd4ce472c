//! # Domain Entities
//!
//! Core persisted data structures of the content engine.
//!
//! ## Type Decisions
//!
//! - `Timestamp(u64)` - nanoseconds since the Unix epoch. Unsigned so the
//!   8-byte big-endian encoding sorts chronologically, which the active-poll
//!   queue key depends on. u64 covers dates until the year 2554.
//! - Ids are fixed-width newtypes (`u64` tenants/posts, `u32` attachments)
//!   so compound keys stay fixed-width and ordered.

use serde::{Deserialize, Serialize};

/// Opaque scope under which all ids and indices are namespaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenantId(pub u64);

/// Per-tenant monotonic post identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

/// Per-post monotonic attachment identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub u32);

/// Nanoseconds since the Unix epoch.
///
/// The engine never reads a clock; hosts pass `Timestamp` values into every
/// time-observing operation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Big-endian key encoding; lexicographic order equals chronological.
    pub fn to_key_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_key_bytes(bytes: [u8; 8]) -> Self {
        Timestamp(u64::from_be_bytes(bytes))
    }

    pub fn plus_nanos(self, nanos: u64) -> Self {
        Timestamp(self.0.saturating_add(nanos))
    }

    pub fn minus_nanos(self, nanos: u64) -> Self {
        Timestamp(self.0.saturating_sub(nanos))
    }
}

/// A root content unit, optionally a comment on another post.
///
/// Append-only once created except for `text`, whose edits also move
/// `last_edited`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub tenant: TenantId,
    pub id: PostId,
    /// Authenticated caller identity, opaque to the engine.
    pub author: String,
    pub text: String,
    /// Present when this post is a comment on another post.
    pub parent: Option<PostId>,
    pub created_at: Timestamp,
    pub last_edited: Option<Timestamp>,
}

impl Post {
    /// Hashtags carried by the post text: `#` followed by alphanumeric or
    /// underscore characters, lowercased. Used by the query engine's
    /// all-tags-must-match filter.
    pub fn hashtags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '#' {
                continue;
            }
            let mut tag = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    tag.extend(next.to_lowercase());
                    chars.next();
                } else {
                    break;
                }
            }
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Whether this post is a comment (carries a parent reference).
    pub fn is_comment(&self) -> bool {
        self.parent.is_some()
    }
}

/// A content item attached to a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub tenant: TenantId,
    pub post_id: PostId,
    pub id: AttachmentId,
    pub content: AttachmentContent,
}

/// Attachment payload. Consumption sites match exhaustively so adding a new
/// kind is a controlled extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentContent {
    Media { uri: String, mime_type: String },
    Poll(Poll),
}

impl AttachmentContent {
    pub fn as_poll(&self) -> Option<&Poll> {
        match self {
            AttachmentContent::Poll(poll) => Some(poll),
            AttachmentContent::Media { .. } => None,
        }
    }

    pub fn as_poll_mut(&mut self) -> Option<&mut Poll> {
        match self {
            AttachmentContent::Poll(poll) => Some(poll),
            AttachmentContent::Media { .. } => None,
        }
    }

    pub fn is_poll(&self) -> bool {
        matches!(self, AttachmentContent::Poll(_))
    }
}

/// A single/multi-choice questionnaire with a closing deadline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    /// Answer options in declaration order; tally results keep this order.
    pub provided_answers: Vec<String>,
    pub end_time: Timestamp,
    pub allows_multiple_answers: bool,
    pub allows_answer_edits: bool,
    /// True until the poll is tallied. A tallied poll is immutable.
    pub is_open: bool,
    pub final_tally: Option<TallyResults>,
}

impl Poll {
    /// Whether the poll still accepts answers at `now`.
    pub fn accepts_answers_at(&self, now: Timestamp) -> bool {
        self.is_open && self.final_tally.is_none() && now < self.end_time
    }
}

/// Immutable per-answer vote counts computed once a poll closes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResults {
    /// One entry per provided answer, in declaration-index order (never by
    /// vote count - that is the deterministic display/tie-break order).
    pub results: Vec<AnswerResult>,
}

/// Vote count for a single provided answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer_index: u32,
    pub votes: u64,
}

impl TallyResults {
    /// Total votes across all answers. A user selecting k options counts k
    /// times.
    pub fn total_votes(&self) -> u64 {
        self.results.iter().map(|r| r.votes).sum()
    }
}

/// One user's chosen answer indexes for a poll. Indexes are kept sorted and
/// deduplicated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub tenant: TenantId,
    pub post_id: PostId,
    pub poll_id: AttachmentId,
    pub user: String,
    pub answer_indexes: Vec<u32>,
}

/// A user's reaction to a post. Unique per (post, user, value).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub tenant: TenantId,
    pub post_id: PostId,
    pub user: String,
    pub value: String,
}

/// Tenant-scoped shortcode -> display value mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredReaction {
    pub tenant: TenantId,
    pub shortcode: String,
    pub display_value: String,
}

/// Structural limits applied before any write.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum post text length in bytes.
    pub max_text_length: usize,
    /// Maximum provided answers per poll.
    pub max_poll_answers: usize,
    /// Maximum reaction value / registered shortcode length in bytes.
    pub max_reaction_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_text_length: 500,
            max_poll_answers: 50,
            max_reaction_length: 100,
        }
    }
}
