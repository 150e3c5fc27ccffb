use std::cmp::Reverse;
use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::pool::{CandidatePool, Tier};
use super::store::{ContentRef, FeedStore};
use crate::Result;

/// What the sources know about the viewer for one feed request.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub viewer_id: Uuid,
    pub followed: HashSet<Uuid>,
    /// Lowercased, trimmed, de-duplicated, sorted.
    pub interests: Vec<String>,
    pub include_own_content: bool,
}

impl ViewerContext {
    pub fn excluded_author(&self) -> Option<Uuid> {
        if self.include_own_content {
            None
        } else {
            Some(self.viewer_id)
        }
    }
}

/// Lowercases and trims a label; blank labels yield `None`.
pub fn normalize_label(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_lowercase())
    }
}

pub fn normalize_labels<'a>(labels: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut normalized: Vec<String> = labels
        .into_iter()
        .filter_map(|label| normalize_label(label))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    normalized.sort();
    normalized
}

/// One stage of the feed pipeline.
///
/// Stages run in order against the same pool. `target` is how many pooled
/// entries the requested window needs; a stage never has to return more.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn tier(&self) -> Tier;

    async fn gather(
        &self,
        store: &dyn FeedStore,
        viewer: &ViewerContext,
        pool: &CandidatePool,
        target: usize,
    ) -> Result<Vec<ContentRef>>;
}

fn newest_first(items: &mut [ContentRef]) {
    items.sort_by_key(|c| Reverse((c.created_at, c.id)));
}

/// Posts by followed authors, newest first.
pub struct SocialSource;

#[async_trait]
impl CandidateSource for SocialSource {
    fn tier(&self) -> Tier {
        Tier::Social
    }

    async fn gather(
        &self,
        store: &dyn FeedStore,
        viewer: &ViewerContext,
        _pool: &CandidatePool,
        target: usize,
    ) -> Result<Vec<ContentRef>> {
        let excluded = viewer.excluded_author();
        let mut authors: Vec<Uuid> = viewer
            .followed
            .iter()
            .copied()
            .filter(|id| Some(*id) != excluded)
            .collect();
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        authors.sort();

        let mut items = store.recent_by_authors(&authors, to_limit(target)).await?;
        newest_first(&mut items);
        Ok(items)
    }
}

/// Posts whose tags match the viewer's interests, most matches first.
pub struct InterestSource;

#[async_trait]
impl CandidateSource for InterestSource {
    fn tier(&self) -> Tier {
        Tier::Interest
    }

    async fn gather(
        &self,
        store: &dyn FeedStore,
        viewer: &ViewerContext,
        _pool: &CandidatePool,
        target: usize,
    ) -> Result<Vec<ContentRef>> {
        if viewer.interests.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches = store
            .recent_by_tag_labels(&viewer.interests, viewer.excluded_author(), to_limit(target))
            .await?;
        matches.sort_by_key(|m| Reverse((m.matched_tag_count, m.content.created_at, m.content.id)));
        Ok(matches.into_iter().map(|m| m.content).collect())
    }
}

/// Globally recent posts, only consulted while the pool is short.
pub struct RecentSource;

#[async_trait]
impl CandidateSource for RecentSource {
    fn tier(&self) -> Tier {
        Tier::Recent
    }

    async fn gather(
        &self,
        store: &dyn FeedStore,
        viewer: &ViewerContext,
        pool: &CandidatePool,
        target: usize,
    ) -> Result<Vec<ContentRef>> {
        if pool.len() >= target {
            debug!(pooled = pool.len(), target, "pool already full, skipping recency backfill");
            return Ok(Vec::new());
        }

        let missing = target - pool.len();
        let mut items = store
            .global_recent(viewer.excluded_author(), &pool.ids(), to_limit(missing))
            .await?;
        newest_first(&mut items);
        Ok(items)
    }
}

/// Social, then interest, then recency fallback.
pub fn default_sources() -> Vec<Box<dyn CandidateSource>> {
    vec![
        Box::new(SocialSource),
        Box::new(InterestSource),
        Box::new(RecentSource),
    ]
}

fn to_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
