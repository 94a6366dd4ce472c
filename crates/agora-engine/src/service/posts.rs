//! Post repository: posts, attachments, and reactions, with per-tenant and
//! per-post monotonic id counters.

use crate::domain::entities::{
    Attachment, AttachmentContent, AttachmentId, Post, PostId, Reaction, RegisteredReaction,
    TenantId, Timestamp,
};
use crate::domain::errors::EngineError;
use crate::domain::{keys, validation};
use crate::events::{Event, EventKind, EventSink};
use crate::service::PostEngine;
use agora_store::{BatchOperation, ContentStore};
use tracing::debug;

impl<S: ContentStore, E: EventSink> PostEngine<S, E> {
    /// Next post id for the tenant. The counter row is created lazily on
    /// first use; ids start at 1 so that 0 is never a valid reference.
    fn next_post_id(&self, tenant: TenantId) -> Result<PostId, EngineError> {
        let key = keys::next_post_id_key(tenant);
        match self.store().get(&key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    EngineError::Store(agora_store::StoreError::CorruptedValue {
                        key_hex: hex::encode(&key),
                        reason: format!("counter is {} bytes, expected 8", bytes.len()),
                    })
                })?;
                Ok(PostId(u64::from_be_bytes(raw)))
            }
            None => Ok(PostId(1)),
        }
    }

    /// Next attachment id within a post. Seeded to 1 when the post is
    /// created.
    fn next_attachment_id(
        &self,
        tenant: TenantId,
        post_id: PostId,
    ) -> Result<AttachmentId, EngineError> {
        let key = keys::next_attachment_id_key(tenant, post_id);
        match self.store().get(&key)? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    EngineError::Store(agora_store::StoreError::CorruptedValue {
                        key_hex: hex::encode(&key),
                        reason: format!("counter is {} bytes, expected 4", bytes.len()),
                    })
                })?;
                Ok(AttachmentId(u32::from_be_bytes(raw)))
            }
            None => Ok(AttachmentId(1)),
        }
    }

    // === Posts ===

    /// Create a post, allocating the next per-tenant id.
    pub fn create_post(
        &mut self,
        now: Timestamp,
        tenant: TenantId,
        author: &str,
        text: &str,
        parent: Option<PostId>,
    ) -> Result<Post, EngineError> {
        validation::validate_user(author)?;
        validation::validate_post_text(self.config(), text)?;

        if let Some(parent_id) = parent {
            if !self.has_post(tenant, parent_id)? {
                return Err(EngineError::invalid_argument(format!(
                    "parent post {} does not exist",
                    parent_id.0
                )));
            }
        }

        let id = self.next_post_id(tenant)?;
        let post = Post {
            tenant,
            id,
            author: author.to_owned(),
            text: text.to_owned(),
            parent,
            created_at: now,
            last_edited: None,
        };

        // Post, id counter, and attachment counter land together: a partial
        // write would let the next create_post reallocate this id.
        self.store_mut().atomic_batch_write(vec![
            BatchOperation::put(keys::post_key(tenant, id), Self::encode(&post)?),
            BatchOperation::put(
                keys::next_post_id_key(tenant),
                (id.0 + 1).to_be_bytes().to_vec(),
            ),
            BatchOperation::put(
                keys::next_attachment_id_key(tenant, id),
                1u32.to_be_bytes().to_vec(),
            ),
        ])?;

        debug!(tenant = tenant.0, post = id.0, "post saved");
        self.emit(
            Event::new(EventKind::PostCreated)
                .tenant(tenant)
                .post(id)
                .attr("author", author)
                .at(now),
        );
        Ok(post)
    }

    pub fn get_post(&self, tenant: TenantId, post_id: PostId) -> Result<Post, EngineError> {
        self.get_entity(&keys::post_key(tenant, post_id))?
            .ok_or_else(|| EngineError::not_found(format!("post {}", post_id.0)))
    }

    pub fn has_post(&self, tenant: TenantId, post_id: PostId) -> Result<bool, EngineError> {
        Ok(self.store().has(&keys::post_key(tenant, post_id))?)
    }

    /// Edit a post's text. Only the original author may edit; text is the
    /// only mutable field.
    pub fn edit_post(
        &mut self,
        now: Timestamp,
        tenant: TenantId,
        post_id: PostId,
        editor: &str,
        new_text: &str,
    ) -> Result<Post, EngineError> {
        let mut post = self.get_post(tenant, post_id)?;
        if post.author != editor {
            return Err(EngineError::permission_denied(
                "only the author can edit a post",
            ));
        }
        validation::validate_post_text(self.config(), new_text)?;

        post.text = new_text.to_owned();
        post.last_edited = Some(now);
        self.put_entity(&keys::post_key(tenant, post_id), &post)?;

        self.emit(
            Event::new(EventKind::PostEdited)
                .tenant(tenant)
                .post(post_id)
                .at(now),
        );
        Ok(post)
    }

    // === Attachments ===

    /// Attach content to a post. A poll attachment additionally gets an
    /// active-poll queue entry keyed on its end time.
    pub fn add_attachment(
        &mut self,
        now: Timestamp,
        tenant: TenantId,
        post_id: PostId,
        editor: &str,
        content: AttachmentContent,
    ) -> Result<Attachment, EngineError> {
        let post = self.get_post(tenant, post_id)?;
        if post.author != editor {
            return Err(EngineError::permission_denied(
                "only the author can attach content to a post",
            ));
        }
        validation::validate_attachment_content(self.config(), &content)?;

        let mut content = content;
        if let Some(poll) = content.as_poll_mut() {
            if poll.final_tally.is_some() {
                return Err(EngineError::invalid_argument(
                    "a new poll cannot carry a final tally",
                ));
            }
            if poll.end_time <= now {
                return Err(EngineError::invalid_argument(
                    "poll end time must be in the future",
                ));
            }
            poll.is_open = true;
        }

        let id = self.next_attachment_id(tenant, post_id)?;
        let attachment = Attachment {
            tenant,
            post_id,
            id,
            content,
        };

        let mut batch = vec![
            BatchOperation::put(
                keys::attachment_key(tenant, post_id, id),
                Self::encode(&attachment)?,
            ),
            BatchOperation::put(
                keys::next_attachment_id_key(tenant, post_id),
                (id.0 + 1).to_be_bytes().to_vec(),
            ),
        ];
        if let Some(poll) = attachment.content.as_poll() {
            batch.push(BatchOperation::put(
                keys::active_poll_key(poll.end_time, tenant, post_id, id),
                vec![0x01],
            ));
        }
        self.store_mut().atomic_batch_write(batch)?;

        debug!(
            tenant = tenant.0,
            post = post_id.0,
            attachment = id.0,
            poll = attachment.content.is_poll(),
            "attachment saved"
        );
        self.emit(
            Event::new(EventKind::AttachmentAdded)
                .tenant(tenant)
                .post(post_id)
                .attr("attachment_id", id.0)
                .at(now),
        );
        Ok(attachment)
    }

    pub fn get_attachment(
        &self,
        tenant: TenantId,
        post_id: PostId,
        attachment_id: AttachmentId,
    ) -> Result<Attachment, EngineError> {
        self.get_entity(&keys::attachment_key(tenant, post_id, attachment_id))?
            .ok_or_else(|| {
                EngineError::not_found(format!(
                    "attachment {} on post {}",
                    attachment_id.0, post_id.0
                ))
            })
    }

    /// All attachments of a post, in attachment-id order. Empty when the
    /// post has none (or does not exist); list queries never report absence.
    pub fn list_attachments(
        &self,
        tenant: TenantId,
        post_id: PostId,
    ) -> Result<Vec<Attachment>, EngineError> {
        let entries = self
            .store()
            .prefix_scan(&keys::attachments_prefix(tenant, post_id))?;
        entries
            .iter()
            .map(|(k, v)| Self::decode(k, v))
            .collect()
    }

    // === Reactions ===

    /// React to a post. One reaction per (user, value) per post.
    pub fn add_reaction(
        &mut self,
        tenant: TenantId,
        post_id: PostId,
        user: &str,
        value: &str,
    ) -> Result<Reaction, EngineError> {
        validation::validate_user(user)?;
        validation::validate_reaction_value(self.config(), value)?;
        if !self.has_post(tenant, post_id)? {
            return Err(EngineError::not_found(format!("post {}", post_id.0)));
        }

        let key = keys::reaction_key(tenant, post_id, user, value);
        if self.store().has(&key)? {
            return Err(EngineError::already_exists(format!(
                "reaction {value} by {user} on post {}",
                post_id.0
            )));
        }

        let reaction = Reaction {
            tenant,
            post_id,
            user: user.to_owned(),
            value: value.to_owned(),
        };
        self.put_entity(&key, &reaction)?;

        self.emit(
            Event::new(EventKind::ReactionAdded)
                .tenant(tenant)
                .post(post_id)
                .attr("user", user)
                .attr("value", value),
        );
        Ok(reaction)
    }

    pub fn remove_reaction(
        &mut self,
        tenant: TenantId,
        post_id: PostId,
        user: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        // Same input bounds as add_reaction: an oversized user would
        // truncate in the key's length prefix and probe a wrong key.
        validation::validate_user(user)?;
        validation::validate_reaction_value(self.config(), value)?;

        let key = keys::reaction_key(tenant, post_id, user, value);
        if !self.store().has(&key)? {
            return Err(EngineError::not_found(format!(
                "reaction {value} by {user} on post {}",
                post_id.0
            )));
        }
        self.store_mut().delete(&key)?;

        self.emit(
            Event::new(EventKind::ReactionRemoved)
                .tenant(tenant)
                .post(post_id)
                .attr("user", user)
                .attr("value", value),
        );
        Ok(())
    }

    /// All reactions on a post.
    pub fn list_reactions(
        &self,
        tenant: TenantId,
        post_id: PostId,
    ) -> Result<Vec<Reaction>, EngineError> {
        let entries = self
            .store()
            .prefix_scan(&keys::reactions_prefix(tenant, post_id))?;
        entries
            .iter()
            .map(|(k, v)| Self::decode(k, v))
            .collect()
    }

    /// Register a tenant-scoped shortcode -> display value mapping.
    pub fn register_reaction(
        &mut self,
        tenant: TenantId,
        shortcode: &str,
        display_value: &str,
    ) -> Result<RegisteredReaction, EngineError> {
        validation::validate_shortcode(self.config(), shortcode)?;
        validation::validate_reaction_value(self.config(), display_value)?;

        let key = keys::registered_reaction_key(tenant, shortcode);
        if self.store().has(&key)? {
            return Err(EngineError::already_exists(format!(
                "registered reaction {shortcode}"
            )));
        }

        let registered = RegisteredReaction {
            tenant,
            shortcode: shortcode.to_owned(),
            display_value: display_value.to_owned(),
        };
        self.put_entity(&key, &registered)?;

        self.emit(
            Event::new(EventKind::ReactionRegistered)
                .tenant(tenant)
                .attr("shortcode", shortcode),
        );
        Ok(registered)
    }

    /// All registered reactions of a tenant, in shortcode order.
    pub fn list_registered_reactions(
        &self,
        tenant: TenantId,
    ) -> Result<Vec<RegisteredReaction>, EngineError> {
        let entries = self
            .store()
            .prefix_scan(&keys::registered_reactions_prefix(tenant))?;
        entries
            .iter()
            .map(|(k, v)| Self::decode(k, v))
            .collect()
    }
}
