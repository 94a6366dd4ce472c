//! Batch cross-entity consistency checks.
//!
//! Read-only and intended for periodic or diagnostic use, not the request
//! hot path: each check walks a whole table across tenants.

use crate::domain::entities::{Post, Reaction, UserAnswer};
use crate::domain::errors::EngineError;
use crate::domain::{keys, validation};
use crate::events::EventSink;
use crate::service::PostEngine;
use agora_store::ContentStore;

/// Outcome of one invariant check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvariantReport {
    pub name: &'static str,
    /// Human-readable summary; lists the offending entities when violated.
    pub description: String,
    pub violated: bool,
}

impl InvariantReport {
    fn ok(name: &'static str) -> Self {
        Self {
            name,
            description: "no violations".to_owned(),
            violated: false,
        }
    }

    fn from_violations(name: &'static str, violations: Vec<String>) -> Self {
        if violations.is_empty() {
            Self::ok(name)
        } else {
            Self {
                name,
                description: format!("{} violation(s): {}", violations.len(), violations.join("; ")),
                violated: true,
            }
        }
    }
}

impl<S: ContentStore, E: EventSink> PostEngine<S, E> {
    /// Run every registered invariant check and report each outcome.
    pub fn run_invariants(&self) -> Result<Vec<InvariantReport>, EngineError> {
        Ok(vec![
            self.check_valid_posts()?,
            self.check_comment_timestamps()?,
            self.check_reactions_reference_posts()?,
            self.check_answers_reference_polls()?,
        ])
    }

    /// Every stored post still passes its structural validator.
    fn check_valid_posts(&self) -> Result<InvariantReport, EngineError> {
        let mut violations = Vec::new();
        for (key, value) in &self.store().prefix_scan(&keys::all_posts_prefix())? {
            let post: Post = Self::decode(key, value)?;
            if let Err(err) = validation::validate_user(&post.author)
                .and_then(|()| validation::validate_post_text(self.config(), &post.text))
            {
                violations.push(format!(
                    "post {}/{}: {}",
                    post.tenant.0, post.id.0, err
                ));
            }
        }
        Ok(InvariantReport::from_violations("valid-posts", violations))
    }

    /// A comment can never predate its parent.
    fn check_comment_timestamps(&self) -> Result<InvariantReport, EngineError> {
        let mut violations = Vec::new();
        for (key, value) in &self.store().prefix_scan(&keys::all_posts_prefix())? {
            let post: Post = Self::decode(key, value)?;
            let Some(parent_id) = post.parent else {
                continue;
            };
            match self.get_entity::<Post>(&keys::post_key(post.tenant, parent_id))? {
                None => violations.push(format!(
                    "comment {}/{} references missing parent {}",
                    post.tenant.0, post.id.0, parent_id.0
                )),
                Some(parent) if post.created_at < parent.created_at => violations.push(format!(
                    "comment {}/{} predates its parent {}",
                    post.tenant.0, post.id.0, parent_id.0
                )),
                Some(_) => {}
            }
        }
        Ok(InvariantReport::from_violations(
            "comments-after-parents",
            violations,
        ))
    }

    /// Every stored reaction references an existing post.
    fn check_reactions_reference_posts(&self) -> Result<InvariantReport, EngineError> {
        let mut violations = Vec::new();
        for (key, value) in &self.store().prefix_scan(&keys::all_reactions_prefix())? {
            let reaction: Reaction = Self::decode(key, value)?;
            if !self.has_post(reaction.tenant, reaction.post_id)? {
                violations.push(format!(
                    "reaction {} by {} references missing post {}/{}",
                    reaction.value, reaction.user, reaction.tenant.0, reaction.post_id.0
                ));
            }
        }
        Ok(InvariantReport::from_violations(
            "reactions-reference-posts",
            violations,
        ))
    }

    /// Every stored user answer references a post carrying that poll.
    fn check_answers_reference_polls(&self) -> Result<InvariantReport, EngineError> {
        let mut violations = Vec::new();
        for (key, value) in &self.store().prefix_scan(&keys::all_user_answers_prefix())? {
            let answer: UserAnswer = Self::decode(key, value)?;
            let attachment = self
                .get_entity::<crate::domain::entities::Attachment>(&keys::attachment_key(
                    answer.tenant,
                    answer.post_id,
                    answer.poll_id,
                ))?;
            let is_poll = attachment
                .as_ref()
                .map(|a| a.content.is_poll())
                .unwrap_or(false);
            if !self.has_post(answer.tenant, answer.post_id)? || !is_poll {
                violations.push(format!(
                    "answer by {} references missing poll {}/{}/{}",
                    answer.user, answer.tenant.0, answer.post_id.0, answer.poll_id.0
                ));
            }
        }
        Ok(InvariantReport::from_violations(
            "answers-reference-polls",
            violations,
        ))
    }
}
