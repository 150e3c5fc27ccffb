use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::ContentRef;

/// Priority band a feed entry came from. Earlier bands always rank higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Social,
    Interest,
    Recent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedItem {
    pub content: ContentRef,
    pub tier: Tier,
}

/// Ordered, de-duplicated accumulation of candidates across tiers.
#[derive(Debug, Default)]
pub struct CandidatePool {
    items: Vec<RankedItem>,
    seen: HashSet<Uuid>,
    excluded_author: Option<Uuid>,
}

impl CandidatePool {
    pub fn new(excluded_author: Option<Uuid>) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            excluded_author,
        }
    }

    /// Appends `content` unless it is already pooled or written by the
    /// excluded author. The first occurrence keeps its position and tier.
    pub fn push(&mut self, content: ContentRef, tier: Tier) -> bool {
        if Some(content.author_id) == self.excluded_author {
            return false;
        }
        if !self.seen.insert(content.id) {
            return false;
        }
        self.items.push(RankedItem { content, tier });
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.content.id).collect()
    }

    /// Cuts `[offset, offset + limit)` out of the pool.
    pub fn window(self, offset: usize, limit: usize) -> (Vec<RankedItem>, bool) {
        let has_more = self.items.len() > offset.saturating_add(limit);
        let items = self.items.into_iter().skip(offset).take(limit).collect();
        (items, has_more)
    }
}
