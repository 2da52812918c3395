//! Ranking pipeline for the posts/ads feed and the short-video surface.
//!
//! This crate provides:
//! - Pure scoring functions (engagement, time decay, feed score)
//! - `FeedRanker`: quota split between followed and other authors, recency
//!   tie-breaking and a deterministic windowed shuffle
//! - Content similarity (`similarity_score`, `find_similar`, `rank_by_hashtags`)
//! - `Filter` trait and `FilterPipeline` for candidate exclusion
//! - `FeatureEngineer` and `ShortsRecommender` for short videos
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FeedKind, FeedRanker, ShortsRecommender};
//!
//! let feed = FeedRanker::new().rank(&candidates, &following, "alice", FeedKind::Ads.follow_ratio())?;
//!
//! let context = profile::build_viewer_context(&catalog, store.as_ref(), "alice");
//! let shorts = ShortsRecommender::new().recommend(candidates, &context)?;
//! ```

pub mod features;
pub mod feed_ranker;
pub mod filter_pipeline;
pub mod filters;
pub mod relationship;
pub mod scoring;
pub mod shorts;
pub mod similarity;
pub mod traits;

pub use features::{FeatureEngineer, ShortFeatures};
pub use feed_ranker::{FeedKind, FeedRanker, SeededShuffle};
pub use filter_pipeline::FilterPipeline;
pub use relationship::is_followed;
pub use scoring::{engagement_score, feed_score, time_score, time_score_hours};
pub use shorts::ShortsRecommender;
pub use similarity::{find_similar, hashtag_match_score, rank_by_hashtags, similarity_score};
pub use traits::Filter;
