//! Feed Ranker - quota-based ordering for posts/ads feeds
//!
//! ## Algorithm
//! 1. Classify every candidate as followed / other and compute its feed score
//! 2. Sort each partition by score, highest first
//! 3. `total = min(len, 100)`, `followed_quota = floor(total * follow_ratio)`,
//!    `other_quota = total - followed_quota`
//! 4. Take each partition's quota. A short partition is NOT backfilled from
//!    the other one, so the feed may come back shorter than `total`
//! 5. Merge and sort by score; items within 20 points of each other are
//!    ordered newest first instead
//! 6. Shuffle each consecutive window of 5 with a PRNG seeded from the
//!    first character of the viewer id and the window offset
//! 7. Drop the scores and return the items
//!
//! Identical inputs (including `now`) always produce the identical feed.

use crate::relationship::is_followed;
use crate::scoring::feed_score;
use chrono::{DateTime, Utc};
use data_loader::{FeedError, Item, Result, UserId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Feeds served by the ranker, each with the follow ratio its call site uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Ads,
    Shipments,
}

impl FeedKind {
    pub fn follow_ratio(self) -> f64 {
        match self {
            FeedKind::Ads => 0.05,
            FeedKind::Shipments => 0.15,
        }
    }
}

impl FromStr for FeedKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ads" => Ok(FeedKind::Ads),
            "shipments" => Ok(FeedKind::Shipments),
            _ => Err(FeedError::invalid_input("feedKind", s)),
        }
    }
}

/// A candidate with its feed score attached. Never leaves the ranker.
#[derive(Debug, Clone, Copy)]
pub struct RankedCandidate<'a> {
    pub item: &'a Item,
    pub score: f64,
    pub followed: bool,
}

/// The shuffle PRNG: `seed = (seed * 9301 + 49297) mod 233280`.
///
/// Seeded only from the first character of the viewer id, so viewers whose
/// ids share a first character get the same permutation for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededShuffle {
    seed: u64,
}

impl SeededShuffle {
    const MULTIPLIER: u64 = 9301;
    const INCREMENT: u64 = 49297;
    const MODULUS: u64 = 233280;

    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed for the window starting at `window_start`:
    /// code point of the first character of `user_id` plus the offset.
    /// An empty id contributes 0.
    pub fn for_window(user_id: &str, window_start: usize) -> Self {
        let first = user_id.chars().next().map(|c| c as u64).unwrap_or(0);
        Self::new(first + window_start as u64)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance the state and draw an index in `0..remaining`.
    ///
    /// Integer form of `floor(seed / 233280 * remaining)`.
    pub fn next_index(&mut self, remaining: usize) -> usize {
        self.seed = (self.seed * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        (self.seed * remaining as u64 / Self::MODULUS) as usize
    }

    /// Fisher–Yates from the end of `window` toward the start, one draw per swap.
    pub fn shuffle<T>(&mut self, window: &mut [T]) {
        for i in (1..window.len()).rev() {
            let j = self.next_index(i + 1);
            window.swap(i, j);
        }
    }
}

/// Orders the posts/ads feed for one viewer.
#[derive(Debug, Clone)]
pub struct FeedRanker {
    /// Upper bound on the feed length
    max_items: usize,
    /// Size of each shuffle window
    window_size: usize,
    /// Score gap at or below which recency decides the order
    recency_tie_margin: f64,
}

impl Default for FeedRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedRanker {
    pub fn new() -> Self {
        Self {
            max_items: 100,
            window_size: 5,
            recency_tie_margin: 20.0,
        }
    }

    /// Configure the maximum feed length (default: 100)
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Configure the shuffle window size (default: 5)
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    /// Configure the recency tie margin (default: 20)
    pub fn with_recency_tie_margin(mut self, margin: f64) -> Self {
        self.recency_tie_margin = margin;
        self
    }

    /// Rank `candidates` for `user_id` at the current time.
    pub fn rank(
        &self,
        candidates: &[Item],
        following: &HashSet<UserId>,
        user_id: &str,
        follow_ratio: f64,
    ) -> Result<Vec<Item>> {
        self.rank_at(candidates, following, user_id, follow_ratio, Utc::now())
    }

    /// Rank `candidates` for `user_id`, scoring recency against `now`.
    ///
    /// Fails with `InvalidInput` unless `0 < follow_ratio < 1`.
    #[instrument(skip(self, candidates, following), fields(candidate_count = candidates.len()))]
    pub fn rank_at(
        &self,
        candidates: &[Item],
        following: &HashSet<UserId>,
        user_id: &str,
        follow_ratio: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Item>> {
        if !(follow_ratio > 0.0 && follow_ratio < 1.0) {
            return Err(FeedError::invalid_input("followRatio", follow_ratio));
        }

        let scored: Vec<RankedCandidate> = candidates
            .par_iter()
            .map(|item| {
                let followed = is_followed(item, following);
                RankedCandidate {
                    item,
                    score: feed_score(item, followed, now),
                    followed,
                }
            })
            .collect();

        let mut merged = self.select_by_quota(scored, follow_ratio);
        self.order_with_recency_ties(&mut merged);
        self.shuffle_windows(&mut merged, user_id);

        debug!("ranked feed of {} items", merged.len());
        Ok(merged.into_iter().map(|c| c.item.clone()).collect())
    }

    /// Steps 2–4: partition, sort, apply quotas without backfill.
    ///
    /// Returns followed selections followed by other selections.
    pub fn select_by_quota<'a>(
        &self,
        scored: Vec<RankedCandidate<'a>>,
        follow_ratio: f64,
    ) -> Vec<RankedCandidate<'a>> {
        let total = scored.len().min(self.max_items);
        let followed_quota = (total as f64 * follow_ratio).floor() as usize;
        let other_quota = total - followed_quota;

        let (mut followed, mut other): (Vec<_>, Vec<_>) =
            scored.into_iter().partition(|c| c.followed);
        sort_by_score_desc(&mut followed);
        sort_by_score_desc(&mut other);

        debug!(
            "quota split: total={}, followed {}/{} available, other {}/{} available",
            total,
            followed_quota,
            followed.len(),
            other_quota,
            other.len()
        );

        followed.truncate(followed_quota);
        other.truncate(other_quota);
        followed.extend(other);
        followed
    }

    /// Step 5: descending by score, but pairs within the tie margin go
    /// newest first.
    ///
    /// The comparison is not transitive, so this uses a stable insertion
    /// sort whose outcome depends only on the input order.
    pub fn order_with_recency_ties(&self, candidates: &mut [RankedCandidate]) {
        let margin = self.recency_tie_margin;
        let goes_after = |a: &RankedCandidate, b: &RankedCandidate| -> bool {
            if (a.score - b.score).abs() <= margin {
                a.item.created_at < b.item.created_at
            } else {
                a.score < b.score
            }
        };

        for i in 1..candidates.len() {
            let mut j = i;
            while j > 0 && goes_after(&candidates[j - 1], &candidates[j]) {
                candidates.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Step 6: deterministic shuffle of each window.
    pub fn shuffle_windows<T>(&self, items: &mut [T], user_id: &str) {
        for (w, window) in items.chunks_mut(self.window_size).enumerate() {
            let start = w * self.window_size;
            SeededShuffle::for_window(user_id, start).shuffle(window);
        }
    }
}

fn sort_by_score_desc(candidates: &mut [RankedCandidate]) {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
