//! Short-video recommendations.
//!
//! ## Flow
//! 1. Filter out the viewer's own shorts and their last 50 views
//! 2. Score every survivor with [`FeatureEngineer`] (match score 0–100)
//! 3. Sort by match score, highest first
//! 4. Walk the sorted list keeping at most 2 shorts per author among the
//!    first 10 positions, stopping at 20
//! 5. Splice up to `ceil(0.2 * len)` unselected shorts from followed authors
//!    into random positions
//!
//! Step 5 draws from an unseeded RNG, so two calls with the same input can
//! return different orders.

use crate::features::FeatureEngineer;
use crate::filter_pipeline::FilterPipeline;
use crate::relationship::is_followed;
use anyhow::Result;
use chrono::{DateTime, Utc};
use data_loader::Item;
use profile::ViewerContext;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Recommends short videos for one viewer.
pub struct ShortsRecommender {
    limit: usize,
    diversity_window: usize,
    per_author_cap: usize,
    follow_splice_ratio: f64,
    filters: FilterPipeline,
}

impl ShortsRecommender {
    pub fn new() -> Self {
        Self {
            limit: 20,
            diversity_window: 10,
            per_author_cap: 2,
            follow_splice_ratio: 0.2,
            filters: FilterPipeline::for_shorts(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_per_author_cap(mut self, cap: usize) -> Self {
        self.per_author_cap = cap;
        self
    }

    pub fn with_follow_splice_ratio(mut self, ratio: f64) -> Self {
        self.follow_splice_ratio = ratio;
        self
    }

    /// Recommend shorts scored against the current time, splicing with the
    /// thread-local RNG.
    pub fn recommend(&self, candidates: Vec<Item>, context: &ViewerContext) -> Result<Vec<Item>> {
        self.recommend_with(candidates, context, Utc::now(), &mut rand::rng())
    }

    /// Same as [`recommend`](Self::recommend) with an explicit clock and RNG.
    #[instrument(skip(self, candidates, context, rng), fields(user_id = %context.user_id, candidate_count = candidates.len()))]
    pub fn recommend_with<R: Rng>(
        &self,
        candidates: Vec<Item>,
        context: &ViewerContext,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<Item>> {
        if self.limit == 0 {
            return Ok(Vec::new());
        }

        let eligible = self.filters.apply(candidates, context)?;
        let features = FeatureEngineer::new(now).compute_features(&eligible, context);

        let mut scored: Vec<(Item, f64)> = eligible
            .into_iter()
            .zip(features.iter().map(|f| f.match_score()))
            .collect();
        // stable, so equal scores keep candidate order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let (mut selected, leftovers) = self.select_diverse(scored);
        let selected_count = selected.len();
        let spliced = self.splice_followed(&mut selected, leftovers, context, rng);

        debug!(selected_count, spliced, "Recommended {} shorts", selected.len());
        Ok(selected)
    }

    /// Single pass over `scored`; returns the picks and everything not picked
    /// (cap-skipped or past the limit), still in score order.
    fn select_diverse(&self, scored: Vec<(Item, f64)>) -> (Vec<Item>, Vec<Item>) {
        let mut selected: Vec<Item> = Vec::with_capacity(self.limit);
        let mut leftovers = Vec::new();
        let mut per_author: HashMap<String, usize> = HashMap::new();

        for (item, _) in scored {
            if selected.len() >= self.limit {
                leftovers.push(item);
                continue;
            }
            if selected.len() < self.diversity_window {
                let count = per_author.entry(item.author_id.clone()).or_insert(0);
                if *count >= self.per_author_cap {
                    leftovers.push(item);
                    continue;
                }
                *count += 1;
            }
            selected.push(item);
        }
        (selected, leftovers)
    }

    /// Insert followed-author shorts at random positions, keeping the
    /// per-author cap over the diversity window and the overall limit.
    fn splice_followed<R: Rng>(
        &self,
        selected: &mut Vec<Item>,
        leftovers: Vec<Item>,
        context: &ViewerContext,
        rng: &mut R,
    ) -> usize {
        let budget = (self.follow_splice_ratio * selected.len() as f64).ceil() as usize;
        let mut spliced = 0;

        for item in leftovers.into_iter().filter(|i| is_followed(i, &context.following)) {
            if spliced >= budget {
                break;
            }
            let window = selected.len().min(self.diversity_window);
            let author_in_window = selected[..window]
                .iter()
                .filter(|s| s.author_id == item.author_id)
                .count();
            let lowest = if author_in_window < self.per_author_cap {
                0
            } else {
                self.diversity_window
            };
            // never past the limit, or the tail truncation would drop it again
            let highest = selected.len().min(self.limit - 1);
            if lowest > highest {
                continue;
            }

            let position = rng.random_range(lowest..=highest);
            selected.insert(position, item);
            selected.truncate(self.limit);
            spliced += 1;
        }
        spliced
    }
}

impl Default for ShortsRecommender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// Short whose match score is `reactions / 10` (popularity only, stale)
    fn create_test_short(id: &str, author: &str, reactions: u64) -> Item {
        let mut item = Item::new(id, author, now() - Duration::days(30));
        item.view_count = 1000;
        item.reaction_count = reactions;
        item
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn recommend(candidates: Vec<Item>, context: &ViewerContext, seed: u64) -> Vec<Item> {
        let mut rng = StdRng::seed_from_u64(seed);
        ShortsRecommender::new()
            .recommend_with(candidates, context, now(), &mut rng)
            .unwrap()
    }

    #[test]
    fn test_sorted_by_match_score() {
        let candidates = vec![
            create_test_short("low", "a", 10),
            create_test_short("high", "b", 90),
            create_test_short("mid", "c", 50),
        ];
        let result = recommend(candidates, &ViewerContext::new("viewer"), 1);
        assert_eq!(ids(&result), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_excludes_own_and_recent() {
        let mut context = ViewerContext::new("viewer");
        context.recent_views = vec!["seen".to_string()];
        let candidates = vec![
            create_test_short("mine", "viewer", 99),
            create_test_short("seen", "a", 98),
            create_test_short("fresh", "b", 10),
        ];

        let result = recommend(candidates, &context, 1);
        assert_eq!(ids(&result), vec!["fresh"]);
    }

    #[test]
    fn test_author_cap_in_first_ten() {
        let mut candidates: Vec<Item> = (0..5)
            .map(|i| create_test_short(&format!("a{i}"), "prolific", 99 - i))
            .collect();
        candidates.extend((0..10).map(|i| create_test_short(&format!("b{i}"), &format!("author{i}"), 50 - i)));

        let result = recommend(candidates, &ViewerContext::new("viewer"), 1);

        // a2..a4 are dropped while the window is open; nothing else follows them
        assert_eq!(result.len(), 12);
        assert_eq!(&ids(&result)[..3], &["a0", "a1", "b0"]);
        let prolific = result[..10].iter().filter(|i| i.author_id == "prolific").count();
        assert_eq!(prolific, 2);
    }

    #[test]
    fn test_limit_twenty() {
        let candidates: Vec<Item> = (0..40)
            .map(|i| create_test_short(&format!("v{i}"), &format!("author{i}"), 80 - i))
            .collect();
        let result = recommend(candidates, &ViewerContext::new("viewer"), 1);
        assert_eq!(result.len(), 20);
        assert_eq!(result[0].id, "v0");
        assert_eq!(result[19].id, "v19");
    }

    #[test]
    fn test_followed_short_spliced_at_random_positions() {
        let mut context = ViewerContext::new("viewer");
        context.following.insert("friend".to_string());

        let mut positions = HashSet::new();
        for seed in 0..200 {
            let mut candidates: Vec<Item> = (0..25)
                .map(|i| create_test_short(&format!("v{i}"), &format!("author{i}"), 90 - i))
                .collect();
            candidates.push(create_test_short("from_friend", "friend", 0));

            let result = recommend(candidates, &context, seed);
            assert_eq!(result.len(), 20);
            let position = result
                .iter()
                .position(|i| i.id == "from_friend")
                .expect("followed short should be spliced in");
            positions.insert(position);
        }

        // 20 possible slots; 200 draws should hit most of them
        assert!(positions.len() > 10, "only saw positions {positions:?}");
        assert!(positions.iter().all(|p| *p < 20));
    }

    #[test]
    fn test_splice_respects_author_cap() {
        let mut context = ViewerContext::new("viewer");
        context.following.insert("friend".to_string());

        for seed in 0..100 {
            let mut candidates = vec![
                create_test_short("f0", "friend", 99),
                create_test_short("f1", "friend", 98),
                create_test_short("f2", "friend", 97),
            ];
            candidates.extend((0..12).map(|i| create_test_short(&format!("v{i}"), &format!("author{i}"), 50 - i)));

            let result = recommend(candidates, &context, seed);
            let in_window = result[..10].iter().filter(|i| i.author_id == "friend").count();
            assert!(in_window <= 2);
            // 14 selected, ceil(2.8) = 3 splice slots, f2 is the only leftover
            assert!(result.iter().any(|i| i.id == "f2"));
            assert_eq!(result.len(), 15);
        }
    }

    #[test]
    fn test_nothing_to_splice_without_follows() {
        let candidates: Vec<Item> = (0..5)
            .map(|i| create_test_short(&format!("v{i}"), "author", 50 - i))
            .collect();
        let result = recommend(candidates, &ViewerContext::new("viewer"), 7);
        assert_eq!(ids(&result), vec!["v0", "v1"]);
    }

    #[test]
    fn test_builder_overrides() {
        let mut context = ViewerContext::new("viewer");
        context.following.insert("friend".to_string());
        let mut candidates: Vec<Item> = (0..6)
            .map(|i| create_test_short(&format!("v{i}"), "author", 50 - i))
            .collect();
        candidates.push(create_test_short("from_friend", "friend", 0));

        let recommender = ShortsRecommender::new()
            .with_limit(3)
            .with_per_author_cap(3)
            .with_follow_splice_ratio(0.0);
        let result = recommender
            .recommend_with(candidates, &context, now(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(ids(&result), vec!["v0", "v1", "v2"]);
    }

    #[test]
    fn test_empty_candidates() {
        let result = recommend(Vec::new(), &ViewerContext::new("viewer"), 1);
        assert!(result.is_empty());
    }
}
