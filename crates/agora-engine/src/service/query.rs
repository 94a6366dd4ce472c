//! Read-only post listing: predicate filtering, deterministic sorting, and
//! offset/limit pagination over a tenant's posts.

use crate::domain::entities::{Post, PostId, TenantId, Timestamp};
use crate::domain::errors::EngineError;
use crate::domain::keys;
use crate::events::EventSink;
use crate::service::PostEngine;
use agora_store::ContentStore;

/// Filter over a tenant's posts. All set fields must match; `hashtags`
/// requires the post to carry *every* listed tag.
#[derive(Clone, Debug, Default)]
pub struct PostFilter {
    /// Exact parent reference; `Some(parent)` selects that post's comments.
    pub parent: Option<PostId>,
    /// Exact creation time.
    pub created_at: Option<Timestamp>,
    /// Exact author identity.
    pub author: Option<String>,
    /// Lowercased tags the post text must all contain.
    pub hashtags: Vec<String>,
}

impl PostFilter {
    fn matches(&self, post: &Post) -> bool {
        if let Some(parent) = self.parent {
            if post.parent != Some(parent) {
                return false;
            }
        }
        if let Some(created_at) = self.created_at {
            if post.created_at != created_at {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if &post.author != author {
                return false;
            }
        }
        if !self.hashtags.is_empty() {
            let tags = post.hashtags();
            if !self.hashtags.iter().all(|t| tags.contains(t)) {
                return false;
            }
        }
        true
    }
}

/// Sort direction for post listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    CreationAscending,
    CreationDescending,
}

/// Offset/limit page selection. Out-of-range values yield an empty page,
/// never an error.
#[derive(Clone, Copy, Debug)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    pub sort: SortOrder,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            sort: SortOrder::default(),
        }
    }

    pub fn descending(mut self) -> Self {
        self.sort = SortOrder::CreationDescending;
        self
    }
}

impl<S: ContentStore, E: EventSink> PostEngine<S, E> {
    /// List a tenant's posts matching `filter`, sorted by creation time
    /// (post id as the deterministic tie-break), paginated by `page`.
    /// Pure read: no side effects, and an empty result is not an error.
    pub fn list_posts(
        &self,
        tenant: TenantId,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<Post>, EngineError> {
        let entries = self.store().prefix_scan(&keys::posts_prefix(tenant))?;

        let mut posts = Vec::new();
        for (key, value) in &entries {
            let post: Post = Self::decode(key, value)?;
            if filter.matches(&post) {
                posts.push(post);
            }
        }

        posts.sort_by_key(|p| (p.created_at, p.id));
        if page.sort == SortOrder::CreationDescending {
            posts.reverse();
        }

        Ok(posts
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }
}
