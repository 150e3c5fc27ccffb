use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::pool::{CandidatePool, RankedItem};
use super::sources::{default_sources, normalize_labels, CandidateSource, ViewerContext};
use super::store::FeedStore;
use crate::config::{FeedConfig, DEFAULT_FEED_MAX_LIMIT};
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct FeedPolicy {
    pub include_own_content: bool,
    pub max_limit: i64,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            include_own_content: false,
            max_limit: DEFAULT_FEED_MAX_LIMIT,
        }
    }
}

impl From<&FeedConfig> for FeedPolicy {
    fn from(config: &FeedConfig) -> Self {
        Self {
            include_own_content: config.include_own_content,
            max_limit: config.max_limit.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub items: Vec<RankedItem>,
    pub has_more: bool,
    /// Effective window after clamping.
    pub limit: i64,
    pub offset: i64,
}

/// Builds personalised feeds by running candidate sources in priority order
/// over one de-duplicated pool, then cutting the requested window.
pub struct FeedRanker {
    store: Arc<dyn FeedStore>,
    sources: Vec<Box<dyn CandidateSource>>,
    policy: FeedPolicy,
}

impl FeedRanker {
    pub fn new(store: Arc<dyn FeedStore>, policy: FeedPolicy) -> Self {
        Self::with_sources(store, policy, default_sources())
    }

    pub fn with_sources(
        store: Arc<dyn FeedStore>,
        policy: FeedPolicy,
        sources: Vec<Box<dyn CandidateSource>>,
    ) -> Self {
        Self { store, sources, policy }
    }

    pub fn policy(&self) -> FeedPolicy {
        self.policy
    }

    /// Returns the `[offset, offset + limit)` slice of the viewer's feed.
    ///
    /// `limit` is clamped to `[1, max_limit]` and `offset` to `>= 0`. An
    /// unknown viewer gets an empty page. Only storage failures are errors.
    pub async fn get_feed(&self, viewer_id: Uuid, limit: i64, offset: i64) -> Result<FeedPage> {
        let limit = limit.clamp(1, self.policy.max_limit.max(1));
        let offset = offset.max(0);
        let empty = FeedPage { items: Vec::new(), has_more: false, limit, offset };

        if !self.store.viewer_exists(viewer_id).await? {
            debug!(%viewer_id, "feed requested for unknown viewer");
            return Ok(empty);
        }

        let window_offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let window_limit = usize::try_from(limit).unwrap_or(usize::MAX);
        // One past the window so `has_more` can be answered.
        let target = window_offset.saturating_add(window_limit).saturating_add(1);

        let followed = self.store.followed_author_ids(viewer_id).await?;
        let interests = self.store.interest_labels(viewer_id).await?;
        let viewer = ViewerContext {
            viewer_id,
            followed,
            interests: normalize_labels(&interests),
            include_own_content: self.policy.include_own_content,
        };

        let mut pool = CandidatePool::new(viewer.excluded_author());
        for source in &self.sources {
            let candidates = source
                .gather(self.store.as_ref(), &viewer, &pool, target)
                .await?;
            let fetched = candidates.len();
            let mut added = 0;
            for content in candidates {
                if pool.push(content, source.tier()) {
                    added += 1;
                }
            }
            debug!(%viewer_id, tier = ?source.tier(), fetched, added, "feed stage done");
        }

        let pooled = pool.len();
        let (items, has_more) = pool.window(window_offset, window_limit);
        info!(
            %viewer_id,
            followed = viewer.followed.len(),
            interests = viewer.interests.len(),
            pooled,
            returned = items.len(),
            has_more,
            "feed assembled"
        );

        Ok(FeedPage { items, has_more, limit, offset })
    }
}
