//! Poll answering and the tally engine.
//!
//! A poll accepts answers strictly before its end time. Once tallied it is
//! immutable: the final tally is persisted, the queue entry is removed, and
//! the stored user answers are purged (the tally is the durable artifact).

use crate::domain::entities::{
    AnswerResult, AttachmentId, Poll, PostId, TallyResults, TenantId, Timestamp, UserAnswer,
};
use crate::domain::errors::EngineError;
use crate::domain::{keys, validation};
use crate::events::{Event, EventKind, EventSink};
use crate::service::PostEngine;
use agora_store::{BatchOperation, ContentStore};
use tracing::debug;

impl<S: ContentStore, E: EventSink> PostEngine<S, E> {
    /// The poll with the given attachment id, `NotFound` when the
    /// attachment is absent or not a poll.
    pub fn get_poll(
        &self,
        tenant: TenantId,
        post_id: PostId,
        poll_id: AttachmentId,
    ) -> Result<Poll, EngineError> {
        let attachment = self.get_attachment(tenant, post_id, poll_id)?;
        attachment
            .content
            .as_poll()
            .cloned()
            .ok_or_else(|| {
                EngineError::not_found(format!("poll {} on post {}", poll_id.0, post_id.0))
            })
    }

    /// Whether the poll still has an active-poll queue entry.
    pub fn is_poll_active(
        &self,
        tenant: TenantId,
        post_id: PostId,
        poll_id: AttachmentId,
    ) -> Result<bool, EngineError> {
        let poll = self.get_poll(tenant, post_id, poll_id)?;
        Ok(self
            .store()
            .has(&keys::active_poll_key(poll.end_time, tenant, post_id, poll_id))?)
    }

    /// Record a user's answer to an open poll.
    pub fn answer_poll(
        &mut self,
        now: Timestamp,
        tenant: TenantId,
        post_id: PostId,
        poll_id: AttachmentId,
        user: &str,
        answer_indexes: &[u32],
    ) -> Result<UserAnswer, EngineError> {
        validation::validate_user(user)?;
        if !self.has_post(tenant, post_id)? {
            return Err(EngineError::not_found(format!("post {}", post_id.0)));
        }
        let poll = self.get_poll(tenant, post_id, poll_id)?;

        if !poll.accepts_answers_at(now) {
            return Err(EngineError::failed_precondition(
                "the poll voting period has ended",
            ));
        }
        if answer_indexes.len() > 1 && !poll.allows_multiple_answers {
            return Err(EngineError::failed_precondition(
                "only one answer is allowed on this poll",
            ));
        }

        let key = keys::user_answer_key(tenant, post_id, poll_id, user);
        if self.store().has(&key)? && !poll.allows_answer_edits {
            return Err(EngineError::failed_precondition(
                "this poll does not allow answer edits",
            ));
        }

        let answer = UserAnswer {
            tenant,
            post_id,
            poll_id,
            user: user.to_owned(),
            answer_indexes: validation::normalize_answer_indexes(&poll, answer_indexes)?,
        };
        self.put_entity(&key, &answer)?;

        self.emit(
            Event::new(EventKind::PollAnswered)
                .tenant(tenant)
                .post(post_id)
                .poll(poll_id)
                .attr("user", user)
                .at(now),
        );
        Ok(answer)
    }

    /// All stored answers for a poll, in user order. Empty once the poll
    /// has been tallied.
    pub fn get_poll_answers(
        &self,
        tenant: TenantId,
        post_id: PostId,
        poll_id: AttachmentId,
    ) -> Result<Vec<UserAnswer>, EngineError> {
        let entries = self
            .store()
            .prefix_scan(&keys::poll_answers_prefix(tenant, post_id, poll_id))?;
        entries
            .iter()
            .map(|(k, v)| Self::decode(k, v))
            .collect()
    }

    /// Tally a poll and finalize it.
    ///
    /// Idempotent: a poll that already carries a final tally is left
    /// untouched and the call succeeds. Counts are produced per provided
    /// answer in declaration order, which fixes the display order and the
    /// tie-break deterministically; a user who selected k options
    /// contributes to k counts.
    pub fn tally_poll(
        &mut self,
        tenant: TenantId,
        post_id: PostId,
        poll_id: AttachmentId,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let mut attachment = self.get_attachment(tenant, post_id, poll_id)?;
        let poll = attachment.content.as_poll_mut().ok_or_else(|| {
            EngineError::not_found(format!("poll {} on post {}", poll_id.0, post_id.0))
        })?;

        if poll.final_tally.is_some() {
            // Already finalized; retries are no-ops.
            return Ok(());
        }
        if now < poll.end_time {
            return Err(EngineError::failed_precondition(
                "poll voting period has not ended yet",
            ));
        }

        let answers = self
            .store()
            .prefix_scan(&keys::poll_answers_prefix(tenant, post_id, poll_id))?;

        let mut counts = vec![0u64; poll.provided_answers.len()];
        let mut answer_keys = Vec::with_capacity(answers.len());
        for (key, value) in &answers {
            let answer: UserAnswer = Self::decode(key, value)?;
            for index in answer.answer_indexes {
                if let Some(count) = counts.get_mut(index as usize) {
                    *count += 1;
                }
            }
            answer_keys.push(key.clone());
        }

        let voters = answer_keys.len();
        poll.final_tally = Some(TallyResults {
            results: counts
                .iter()
                .enumerate()
                .map(|(index, &votes)| AnswerResult {
                    answer_index: index as u32,
                    votes,
                })
                .collect(),
        });
        poll.is_open = false;
        let end_time = poll.end_time;

        // Finalized poll, queue removal, and answer purge land together.
        let mut batch = vec![
            BatchOperation::put(
                keys::attachment_key(tenant, post_id, poll_id),
                Self::encode(&attachment)?,
            ),
            BatchOperation::delete(keys::active_poll_key(end_time, tenant, post_id, poll_id)),
        ];
        batch.extend(answer_keys.into_iter().map(BatchOperation::delete));
        self.store_mut().atomic_batch_write(batch)?;

        debug!(
            tenant = tenant.0,
            post = post_id.0,
            poll = poll_id.0,
            voters,
            "poll tallied"
        );
        self.emit(
            Event::new(EventKind::PollClosed)
                .tenant(tenant)
                .post(post_id)
                .poll(poll_id)
                .attr("voters", voters)
                .at(now),
        );
        Ok(())
    }
}
