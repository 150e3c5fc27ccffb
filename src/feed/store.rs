use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::Result;

/// A post as the ranker sees it: identity, author and age, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContentRef {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A post found through tag labels, with how many of its tags matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    pub content: ContentRef,
    pub matched_tag_count: i64,
}

/// Read-only lookups the feed ranker needs from storage.
///
/// Every "recent" lookup returns newest first, ties broken by id descending,
/// truncated to `limit`. Tag labels are passed already lowercased and must be
/// compared against lowercased stored labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn viewer_exists(&self, viewer_id: Uuid) -> Result<bool>;

    async fn followed_author_ids(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>>;

    async fn interest_labels(&self, viewer_id: Uuid) -> Result<HashSet<String>>;

    async fn recent_by_authors(&self, author_ids: &[Uuid], limit: i64) -> Result<Vec<ContentRef>>;

    /// Ordered by matched tag count descending, then recency.
    async fn recent_by_tag_labels(
        &self,
        labels: &[String],
        exclude_author: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<TagMatch>>;

    async fn global_recent(
        &self,
        exclude_author: Option<Uuid>,
        exclude_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<ContentRef>>;
}
