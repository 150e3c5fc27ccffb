//! Interest-ranked feed assembly.
//!
//! A feed is the concatenation of three tiers (followed authors, interest
//! tag matches, global recency fallback) with duplicates removed, first
//! occurrence winning, then windowed by offset and limit.

pub mod handlers;
mod pool;
mod ranker;
pub mod sources;
mod store;

pub use pool::{CandidatePool, RankedItem, Tier};
pub use ranker::{FeedPage, FeedPolicy, FeedRanker};
pub use sources::{
    default_sources, normalize_label, normalize_labels, CandidateSource, InterestSource,
    RecentSource, SocialSource, ViewerContext,
};
pub use store::{ContentRef, FeedStore, TagMatch};
