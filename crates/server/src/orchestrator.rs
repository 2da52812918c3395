//! # Recommendation Orchestrator
//!
//! Coordinates the catalog, the interaction store and the ranking pipeline
//! for the three read paths and the event write path:
//! 1. `ranked_feed`: candidates -> `FeedRanker` with the feed's follow ratio
//! 2. `recommended_shorts`: viewer context -> `ShortsRecommender`
//! 3. `related_items`: content similarity to one item
//! 4. `record_*`: view / rewatch / engagement events -> `InteractionRecorder`
//!
//! Ranking is CPU-bound, so every read path runs on the blocking pool via
//! `spawn_blocking` and the async caller only awaits the result.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use data_loader::{FeedError, InteractionRecord, Item, ItemCatalog};
use interactions::{EngagementKind, InMemoryInteractionStore, InteractionRecorder, InteractionStore};
use pipeline::{FeedKind, FeedRanker, ShortsRecommender, find_similar};
use profile::{ViewerContext, build_viewer_context};

/// An item related to another one, with its similarity score
#[derive(Debug, Clone)]
pub struct RelatedItem {
    pub item: Item,
    pub similarity: f64,
}

/// Main orchestrator; cheap to clone and share across tasks
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<ItemCatalog>,
    store: Arc<dyn InteractionStore>,
    recorder: InteractionRecorder,
    feed_ranker: Arc<FeedRanker>,
    shorts: Arc<ShortsRecommender>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over an existing interaction store
    pub fn new(catalog: Arc<ItemCatalog>, store: Arc<dyn InteractionStore>) -> Self {
        Self {
            catalog,
            recorder: InteractionRecorder::new(store.clone()),
            store,
            feed_ranker: Arc::new(FeedRanker::new()),
            shorts: Arc::new(ShortsRecommender::new()),
        }
    }

    /// Create an orchestrator whose in-memory store is seeded with the
    /// interactions loaded alongside the catalog
    pub fn from_catalog(catalog: Arc<ItemCatalog>) -> Self {
        let store = InMemoryInteractionStore::from_records(catalog.interactions().iter().cloned());
        info!("Seeded interaction store with {} records", store.len());
        Self::new(catalog, Arc::new(store))
    }

    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    /// Rank the posts/ads feed for `user_id` using the follow ratio of `kind`
    pub async fn ranked_feed(&self, user_id: &str, kind: FeedKind) -> Result<Vec<Item>> {
        self.ranked_feed_with_ratio(user_id, kind.follow_ratio()).await
    }

    /// Rank the feed with an explicit follow ratio, which must be in (0, 1)
    #[instrument(skip(self))]
    pub async fn ranked_feed_with_ratio(&self, user_id: &str, follow_ratio: f64) -> Result<Vec<Item>> {
        let start_time = Instant::now();

        let catalog = self.catalog.clone();
        let ranker = self.feed_ranker.clone();
        let viewer = user_id.to_string();
        let feed = tokio::task::spawn_blocking(move || {
            let candidates = candidates_from(&catalog);
            let following = catalog.following(&viewer);
            ranker.rank(&candidates, &following, &viewer, follow_ratio)
        })
        .await
        .context("Feed ranking task panicked")?
        .context("Failed to rank feed")?;

        info!(
            "Ranked feed of {} items for user {} in {:.2?}",
            feed.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(feed)
    }

    /// Recommend up to 20 shorts for `user_id`
    #[instrument(skip(self))]
    pub async fn recommended_shorts(&self, user_id: &str) -> Result<Vec<Item>> {
        let start_time = Instant::now();

        let catalog = self.catalog.clone();
        let store = self.store.clone();
        let shorts = self.shorts.clone();
        let viewer = user_id.to_string();
        let recommended = tokio::task::spawn_blocking(move || {
            let context = build_viewer_context(&catalog, store.as_ref(), &viewer);
            shorts.recommend(candidates_from(&catalog), &context)
        })
        .await
        .context("Shorts task panicked")??;

        info!(
            "Recommended {} shorts for user {} in {:.2?}",
            recommended.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommended)
    }

    /// Everything the short recommender knows about `user_id`
    pub async fn viewer_context(&self, user_id: &str) -> Result<ViewerContext> {
        let catalog = self.catalog.clone();
        let store = self.store.clone();
        let viewer = user_id.to_string();
        tokio::task::spawn_blocking(move || build_viewer_context(&catalog, store.as_ref(), &viewer))
            .await
            .context("Viewer context task panicked")
    }

    /// Items most similar to `item_id`, best first
    #[instrument(skip(self))]
    pub async fn related_items(&self, item_id: &str, limit: usize) -> Result<Vec<RelatedItem>> {
        let target = self.require_item(item_id)?.clone();

        let catalog = self.catalog.clone();
        let related = tokio::task::spawn_blocking(move || {
            let candidates = candidates_from(&catalog);
            find_similar(&target, &candidates, limit)
                .into_iter()
                .map(|(item, similarity)| RelatedItem {
                    item: item.clone(),
                    similarity,
                })
                .collect::<Vec<_>>()
        })
        .await
        .context("Similarity task panicked")?;

        info!("Found {} items related to {}", related.len(), item_id);
        Ok(related)
    }

    /// Forward a view event. Unknown items are rejected.
    pub async fn record_view(
        &self,
        user_id: &str,
        item_id: &str,
        watch_seconds: f64,
        total_seconds: f64,
    ) -> Result<InteractionRecord> {
        self.require_item(item_id)?;
        let record = self
            .recorder
            .record_view(user_id, item_id, watch_seconds, total_seconds)
            .with_context(|| format!("Failed to record view of {item_id}"))?;
        Ok(record)
    }

    pub async fn record_rewatch(&self, user_id: &str, item_id: &str) -> Result<InteractionRecord> {
        self.require_item(item_id)?;
        Ok(self.recorder.record_rewatch(user_id, item_id))
    }

    pub async fn record_engagement(
        &self,
        user_id: &str,
        item_id: &str,
        kind: EngagementKind,
    ) -> Result<InteractionRecord> {
        self.require_item(item_id)?;
        Ok(self.recorder.record_engagement(user_id, item_id, kind))
    }

    fn require_item(&self, item_id: &str) -> Result<&Item> {
        self.catalog.get_item(item_id).ok_or_else(|| {
            FeedError::MissingReference {
                entity: "item".to_string(),
                id: item_id.to_string(),
            }
            .into()
        })
    }
}

/// Candidate fetch: every catalog item, in catalog order
fn candidates_from(catalog: &ItemCatalog) -> Vec<Item> {
    catalog.all_items().into_iter().cloned().collect()
}
