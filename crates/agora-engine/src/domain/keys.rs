//! # Store Key Layout
//!
//! Byte-level keys for every persisted entity and index. Keys are compound:
//! a single-byte table prefix followed by fixed-width big-endian ids, so
//! lexicographic byte order equals the domain order within each table.
//!
//! ```text
//! 0x01 | tenant                                   -> next post id (u64 BE)
//! 0x02 | tenant | post                            -> Post
//! 0x03 | tenant | post                            -> next attachment id (u32 BE)
//! 0x04 | tenant | post | attachment               -> Attachment
//! 0x05 | tenant | post | poll | user-bytes        -> UserAnswer
//! 0x06 | tenant | post | len(user) | user | value -> Reaction
//! 0x07 | end_time | tenant | post | poll          -> [0x01] (active-poll queue)
//! 0x08 | tenant | shortcode-bytes                 -> RegisteredReaction
//! ```
//!
//! The active-poll queue key leads with the 8-byte big-endian end time:
//! scanning the table forward visits polls in nondecreasing end-time order,
//! with ties broken by tenant, then post, then poll id. That is the whole
//! ordering guarantee of the lifecycle tick.

use crate::domain::entities::{AttachmentId, PostId, TenantId, Timestamp};
use crate::domain::errors::EngineError;

pub const NEXT_POST_ID_PREFIX: u8 = 0x01;
pub const POST_PREFIX: u8 = 0x02;
pub const NEXT_ATTACHMENT_ID_PREFIX: u8 = 0x03;
pub const ATTACHMENT_PREFIX: u8 = 0x04;
pub const USER_ANSWER_PREFIX: u8 = 0x05;
pub const REACTION_PREFIX: u8 = 0x06;
pub const ACTIVE_POLL_QUEUE_PREFIX: u8 = 0x07;
pub const REGISTERED_REACTION_PREFIX: u8 = 0x08;

/// Byte length of an active-poll queue key.
const ACTIVE_POLL_KEY_LEN: usize = 1 + 8 + 8 + 8 + 4;

pub fn next_post_id_key(tenant: TenantId) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(NEXT_POST_ID_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key
}

pub fn post_key(tenant: TenantId, post_id: PostId) -> Vec<u8> {
    let mut key = posts_prefix(tenant);
    key.extend_from_slice(&post_id.0.to_be_bytes());
    key
}

/// Prefix covering every post in the store, across tenants. Used only by
/// the batch invariant checker.
pub fn all_posts_prefix() -> Vec<u8> {
    vec![POST_PREFIX]
}

/// Prefix covering all posts of a tenant.
pub fn posts_prefix(tenant: TenantId) -> Vec<u8> {
    let mut key = Vec::with_capacity(17);
    key.push(POST_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key
}

pub fn next_attachment_id_key(tenant: TenantId, post_id: PostId) -> Vec<u8> {
    let mut key = Vec::with_capacity(17);
    key.push(NEXT_ATTACHMENT_ID_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key.extend_from_slice(&post_id.0.to_be_bytes());
    key
}

pub fn attachment_key(tenant: TenantId, post_id: PostId, attachment_id: AttachmentId) -> Vec<u8> {
    let mut key = attachments_prefix(tenant, post_id);
    key.extend_from_slice(&attachment_id.0.to_be_bytes());
    key
}

/// Prefix covering all attachments of a post, in attachment-id order.
pub fn attachments_prefix(tenant: TenantId, post_id: PostId) -> Vec<u8> {
    let mut key = Vec::with_capacity(21);
    key.push(ATTACHMENT_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key.extend_from_slice(&post_id.0.to_be_bytes());
    key
}

pub fn user_answer_key(
    tenant: TenantId,
    post_id: PostId,
    poll_id: AttachmentId,
    user: &str,
) -> Vec<u8> {
    let mut key = poll_answers_prefix(tenant, post_id, poll_id);
    key.extend_from_slice(user.as_bytes());
    key
}

/// Prefix covering all user answers of a poll, in user order.
pub fn poll_answers_prefix(tenant: TenantId, post_id: PostId, poll_id: AttachmentId) -> Vec<u8> {
    let mut key = Vec::with_capacity(25);
    key.push(USER_ANSWER_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key.extend_from_slice(&post_id.0.to_be_bytes());
    key.extend_from_slice(&poll_id.0.to_be_bytes());
    key
}

/// Prefix covering every user answer in the store, across tenants. Used only
/// by the batch invariant checker.
pub fn all_user_answers_prefix() -> Vec<u8> {
    vec![USER_ANSWER_PREFIX]
}

/// The user segment is length-prefixed because both user and value are
/// variable-width and (user, value) must stay unambiguous as a pair.
pub fn reaction_key(tenant: TenantId, post_id: PostId, user: &str, value: &str) -> Vec<u8> {
    let mut key = reactions_prefix(tenant, post_id);
    key.extend_from_slice(&(user.len() as u16).to_be_bytes());
    key.extend_from_slice(user.as_bytes());
    key.extend_from_slice(value.as_bytes());
    key
}

/// Prefix covering all reactions on a post.
pub fn reactions_prefix(tenant: TenantId, post_id: PostId) -> Vec<u8> {
    let mut key = Vec::with_capacity(17);
    key.push(REACTION_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key.extend_from_slice(&post_id.0.to_be_bytes());
    key
}

/// Prefix covering every reaction in the store. Used by the invariant
/// checker.
pub fn all_reactions_prefix() -> Vec<u8> {
    vec![REACTION_PREFIX]
}

pub fn active_poll_key(
    end_time: Timestamp,
    tenant: TenantId,
    post_id: PostId,
    poll_id: AttachmentId,
) -> Vec<u8> {
    let mut key = Vec::with_capacity(ACTIVE_POLL_KEY_LEN);
    key.push(ACTIVE_POLL_QUEUE_PREFIX);
    key.extend_from_slice(&end_time.to_key_bytes());
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key.extend_from_slice(&post_id.0.to_be_bytes());
    key.extend_from_slice(&poll_id.0.to_be_bytes());
    key
}

/// Start of the active-poll queue table.
pub fn active_poll_queue_prefix() -> Vec<u8> {
    vec![ACTIVE_POLL_QUEUE_PREFIX]
}

/// Exclusive upper bound for queue entries with `end_time <= now`.
///
/// Scanning `[active_poll_queue_prefix(), active_polls_due_end(now))` visits
/// exactly the due polls, so tick cost is bounded by the number of due items
/// rather than the queue size.
pub fn active_polls_due_end(now: Timestamp) -> Vec<u8> {
    match now.0.checked_add(1) {
        Some(next) => {
            let mut key = Vec::with_capacity(9);
            key.push(ACTIVE_POLL_QUEUE_PREFIX);
            key.extend_from_slice(&next.to_be_bytes());
            key
        }
        // now is the maximum representable instant: every entry is due.
        None => vec![ACTIVE_POLL_QUEUE_PREFIX + 1],
    }
}

/// Decode an active-poll queue key back into its components.
pub fn split_active_poll_key(
    key: &[u8],
) -> Result<(Timestamp, TenantId, PostId, AttachmentId), EngineError> {
    let malformed = || {
        EngineError::invalid_argument(format!(
            "malformed active-poll queue key: {}",
            hex::encode(key)
        ))
    };
    if key.len() != ACTIVE_POLL_KEY_LEN || key[0] != ACTIVE_POLL_QUEUE_PREFIX {
        return Err(malformed());
    }
    let u64_at = |start: usize| -> Option<u64> {
        let raw: [u8; 8] = key.get(start..start + 8)?.try_into().ok()?;
        Some(u64::from_be_bytes(raw))
    };
    let u32_at = |start: usize| -> Option<u32> {
        let raw: [u8; 4] = key.get(start..start + 4)?.try_into().ok()?;
        Some(u32::from_be_bytes(raw))
    };

    let end_time = Timestamp(u64_at(1).ok_or_else(malformed)?);
    let tenant = TenantId(u64_at(9).ok_or_else(malformed)?);
    let post_id = PostId(u64_at(17).ok_or_else(malformed)?);
    let poll_id = AttachmentId(u32_at(25).ok_or_else(malformed)?);
    Ok((end_time, tenant, post_id, poll_id))
}

pub fn registered_reaction_key(tenant: TenantId, shortcode: &str) -> Vec<u8> {
    let mut key = registered_reactions_prefix(tenant);
    key.extend_from_slice(shortcode.as_bytes());
    key
}

/// Prefix covering all registered reactions of a tenant, in shortcode order.
pub fn registered_reactions_prefix(tenant: TenantId) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(REGISTERED_REACTION_PREFIX);
    key.extend_from_slice(&tenant.0.to_be_bytes());
    key
}
