//! # Structural Validators
//!
//! One validator per entity type, invoked before any write. These check the
//! shape of a single entity; cross-entity rules (existing parents, open
//! polls, duplicate reactions) live in the service layer where the store is
//! available.

use crate::domain::entities::{AttachmentContent, EngineConfig, Poll};
use crate::domain::errors::EngineError;
use url::Url;

/// Maximum byte length of a user identity. Keeps composite keys bounded.
pub const MAX_USER_LEN: usize = 256;

pub fn validate_user(user: &str) -> Result<(), EngineError> {
    if user.trim().is_empty() {
        return Err(EngineError::invalid_argument("user cannot be empty"));
    }
    if user.len() > MAX_USER_LEN {
        return Err(EngineError::invalid_argument(format!(
            "user exceeds {} bytes",
            MAX_USER_LEN
        )));
    }
    Ok(())
}

pub fn validate_post_text(config: &EngineConfig, text: &str) -> Result<(), EngineError> {
    if text.trim().is_empty() {
        return Err(EngineError::invalid_argument("post text cannot be empty"));
    }
    if text.len() > config.max_text_length {
        return Err(EngineError::invalid_argument(format!(
            "post text exceeds max length of {} bytes",
            config.max_text_length
        )));
    }
    Ok(())
}

pub fn validate_attachment_content(
    config: &EngineConfig,
    content: &AttachmentContent,
) -> Result<(), EngineError> {
    match content {
        AttachmentContent::Media { uri, mime_type } => validate_media(uri, mime_type),
        AttachmentContent::Poll(poll) => validate_poll(config, poll),
    }
}

pub fn validate_media(uri: &str, mime_type: &str) -> Result<(), EngineError> {
    if uri.trim().is_empty() {
        return Err(EngineError::invalid_argument("media uri cannot be empty"));
    }
    Url::parse(uri)
        .map_err(|e| EngineError::invalid_argument(format!("malformed media uri: {e}")))?;
    if mime_type.trim().is_empty() {
        return Err(EngineError::invalid_argument(
            "media mime type cannot be empty",
        ));
    }
    Ok(())
}

pub fn validate_poll(config: &EngineConfig, poll: &Poll) -> Result<(), EngineError> {
    if poll.question.trim().is_empty() {
        return Err(EngineError::invalid_argument("poll question cannot be empty"));
    }

    if poll.provided_answers.len() < 2 {
        return Err(EngineError::invalid_argument(format!(
            "insufficient provided answers: {}",
            poll.provided_answers.len()
        )));
    }
    if poll.provided_answers.len() > config.max_poll_answers {
        return Err(EngineError::invalid_argument(format!(
            "too many provided answers: {} (max {})",
            poll.provided_answers.len(),
            config.max_poll_answers
        )));
    }

    for (i, answer) in poll.provided_answers.iter().enumerate() {
        if answer.trim().is_empty() {
            return Err(EngineError::invalid_argument(format!(
                "provided answer {i} is empty"
            )));
        }
        if poll.provided_answers[..i].contains(answer) {
            return Err(EngineError::invalid_argument(format!(
                "duplicated provided answer: {answer}"
            )));
        }
    }

    if poll.end_time.0 == 0 {
        return Err(EngineError::invalid_argument("poll end time cannot be zero"));
    }

    Ok(())
}

/// Normalize answer indexes: sorted, deduplicated, non-empty, all in range
/// for the poll's provided answers.
pub fn normalize_answer_indexes(poll: &Poll, indexes: &[u32]) -> Result<Vec<u32>, EngineError> {
    if indexes.is_empty() {
        return Err(EngineError::invalid_argument(
            "answer indexes cannot be empty",
        ));
    }

    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let max_index = (poll.provided_answers.len() - 1) as u32;
    if let Some(&highest) = sorted.last() {
        if highest > max_index {
            return Err(EngineError::invalid_argument(format!(
                "invalid answer index: {highest} (max {max_index})"
            )));
        }
    }
    Ok(sorted)
}

pub fn validate_reaction_value(config: &EngineConfig, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::invalid_argument(
            "reaction value cannot be empty",
        ));
    }
    if value.len() > config.max_reaction_length {
        return Err(EngineError::invalid_argument(format!(
            "reaction value exceeds {} bytes",
            config.max_reaction_length
        )));
    }
    Ok(())
}

pub fn validate_shortcode(config: &EngineConfig, shortcode: &str) -> Result<(), EngineError> {
    if shortcode.trim().is_empty() {
        return Err(EngineError::invalid_argument("shortcode cannot be empty"));
    }
    if shortcode.len() > config.max_reaction_length {
        return Err(EngineError::invalid_argument(format!(
            "shortcode exceeds {} bytes",
            config.max_reaction_length
        )));
    }
    if !shortcode
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(EngineError::invalid_argument(
            "shortcode may only contain alphanumerics, '_' and '-'",
        ));
    }
    Ok(())
}
