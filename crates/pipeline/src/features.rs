//! Feature engineering for short-video candidates.
//!
//! Each candidate gets five bounded signals whose sum is its match score:
//!
//! | signal               | range  |
//! |----------------------|--------|
//! | interest overlap     | 0 – 40 |
//! | mood match           | 0, 20  |
//! | category engagement  | 0 – 20 |
//! | popularity           | 0 – 10 |
//! | recency              | 0, 5, 10 |

use chrono::{DateTime, Utc};
use data_loader::{Item, ItemId, normalize_label};
use profile::{PastInteraction, ViewerContext};
use rayon::prelude::*;
use std::collections::HashSet;

use crate::similarity::label_set;

const POINTS_PER_INTEREST: f64 = 10.0;
const MAX_INTEREST_OVERLAP: f64 = 40.0;
const MOOD_MATCH: f64 = 20.0;
const CATEGORY_ENGAGEMENT_SCALE: f64 = 2.0;
const MAX_CATEGORY_ENGAGEMENT: f64 = 20.0;
const MAX_POPULARITY: f64 = 10.0;
const FRESH_BONUS: f64 = 10.0;
const RECENT_BONUS: f64 = 5.0;

/// Features computed for each short candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortFeatures {
    pub item_id: ItemId,
    pub interest_overlap: f64,
    pub mood_match: f64,
    pub category_engagement: f64,
    pub popularity: f64,
    pub recency: f64,
}

impl ShortFeatures {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            interest_overlap: 0.0,
            mood_match: 0.0,
            category_engagement: 0.0,
            popularity: 0.0,
            recency: 0.0,
        }
    }

    /// Sum of all signals, in `[0, 100]`
    pub fn match_score(&self) -> f64 {
        (self.interest_overlap
            + self.mood_match
            + self.category_engagement
            + self.popularity
            + self.recency)
            .clamp(0.0, 100.0)
    }
}

/// Computes short features in parallel.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEngineer {
    now: DateTime<Utc>,
}

impl FeatureEngineer {
    /// Engineer that measures recency against `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// One `ShortFeatures` per candidate, in the same order.
    pub fn compute_features(&self, candidates: &[Item], context: &ViewerContext) -> Vec<ShortFeatures> {
        candidates
            .par_iter()
            .map(|candidate| self.compute_single(candidate, context))
            .collect()
    }

    fn compute_single(&self, candidate: &Item, context: &ViewerContext) -> ShortFeatures {
        let mut features = ShortFeatures::new(candidate.id.clone());
        features.interest_overlap = interest_overlap(candidate, &context.profile.interests);
        features.mood_match = mood_match(candidate, &context.profile.preferred_moods);
        features.category_engagement = category_engagement(candidate, &context.history);
        features.popularity = popularity(candidate);
        features.recency = self.recency(candidate);
        features
    }

    /// +10 under a day old, +5 under three days, else 0
    fn recency(&self, candidate: &Item) -> f64 {
        let hours = candidate.age_hours(self.now);
        if hours < 24.0 {
            FRESH_BONUS
        } else if hours < 72.0 {
            RECENT_BONUS
        } else {
            0.0
        }
    }
}

/// 10 points per profile interest found among the candidate's tags,
/// categories, topics or hashtags, capped at 40.
fn interest_overlap(candidate: &Item, interests: &[String]) -> f64 {
    if interests.is_empty() {
        return 0.0;
    }
    let labels: HashSet<String> = candidate
        .tags
        .iter()
        .chain(&candidate.categories)
        .chain(&candidate.topics)
        .chain(&candidate.hashtags)
        .map(|l| normalize_label(l))
        .collect();
    let hits = interests
        .iter()
        .filter(|interest| labels.contains(&normalize_label(interest)))
        .count();
    (hits as f64 * POINTS_PER_INTEREST).min(MAX_INTEREST_OVERLAP)
}

fn mood_match(candidate: &Item, preferred_moods: &[String]) -> f64 {
    let Some(mood) = candidate.mood.as_deref() else {
        return 0.0;
    };
    let mood = normalize_label(mood);
    if preferred_moods.iter().any(|m| normalize_label(m) == mood) {
        MOOD_MATCH
    } else {
        0.0
    }
}

/// Average engagement over past interactions sharing a category with the
/// candidate: `liked·3 + commented·2 + shared·2 + completed·3`, doubled,
/// capped at 20.
fn category_engagement(candidate: &Item, history: &[PastInteraction]) -> f64 {
    let categories = label_set(&candidate.categories);
    if categories.is_empty() {
        return 0.0;
    }
    let (total, count) = history
        .iter()
        .filter(|past| past.categories.iter().any(|c| categories.contains(c)))
        .fold((0.0, 0usize), |(total, count), past| {
            let r = &past.record;
            let mut points = 0.0;
            if r.liked {
                points += 3.0;
            }
            if r.commented {
                points += 2.0;
            }
            if r.shared {
                points += 2.0;
            }
            if r.completed {
                points += 3.0;
            }
            (total + points, count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    (total / count as f64 * CATEGORY_ENGAGEMENT_SCALE).min(MAX_CATEGORY_ENGAGEMENT)
}

/// `min(10, 100 · (reactions + 2·comments + 3·shares) / max(views, 1))`
///
/// Unlike the feed's engagement score, shares count here.
fn popularity(candidate: &Item) -> f64 {
    let weighted = candidate.reaction_count as f64
        + 2.0 * candidate.comment_count as f64
        + 3.0 * candidate.share_count as f64;
    let views = candidate.view_count.max(1) as f64;
    (100.0 * weighted / views).min(MAX_POPULARITY)
}
