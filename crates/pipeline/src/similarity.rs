//! Content similarity between items.
//!
//! Labels are compared after normalization (trimmed, lowercased, no
//! leading `#`), and each list is treated as a set.

use data_loader::{Item, normalize_label};
use std::cmp::Ordering;
use std::collections::HashSet;

pub const HASHTAG_WEIGHT: f64 = 40.0;
pub const CATEGORY_WEIGHT: f64 = 30.0;
pub const TAG_WEIGHT: f64 = 20.0;
pub const SAME_AUTHOR_BONUS: f64 = 10.0;

pub(crate) fn label_set(labels: &[String]) -> HashSet<String> {
    labels
        .iter()
        .map(|l| normalize_label(l))
        .filter(|l| !l.is_empty())
        .collect()
}

/// `|a ∩ b| / max(|a|, |b|)`, or 0 if either side is empty
fn overlap_ratio(a: &[String], b: &[String]) -> f64 {
    let a = label_set(a);
    let b = label_set(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / a.len().max(b.len()) as f64
}

/// Symmetric similarity in `[0, 100]`:
/// 40·hashtags + 30·categories + 20·tags overlap, +10 for the same author.
pub fn similarity_score(a: &Item, b: &Item) -> f64 {
    let mut score = HASHTAG_WEIGHT * overlap_ratio(&a.hashtags, &b.hashtags)
        + CATEGORY_WEIGHT * overlap_ratio(&a.categories, &b.categories)
        + TAG_WEIGHT * overlap_ratio(&a.tags, &b.tags);
    if a.author_id == b.author_id {
        score += SAME_AUTHOR_BONUS;
    }
    score
}

/// Share of `target_hashtags` that `candidate` carries, in `[0, 100]`.
///
/// Asymmetric: the denominator is the target set, so this measures how
/// much of the wanted topic the candidate covers.
pub fn hashtag_match_score(target_hashtags: &[String], candidate: &Item) -> f64 {
    let target = label_set(target_hashtags);
    if target.is_empty() {
        return 0.0;
    }
    let have = label_set(&candidate.hashtags);
    100.0 * target.intersection(&have).count() as f64 / target.len() as f64
}

/// Items most similar to `target`, best first.
///
/// The target itself and zero-similarity items are left out; equal scores
/// go newest first.
pub fn find_similar<'a>(target: &Item, candidates: &'a [Item], limit: usize) -> Vec<(&'a Item, f64)> {
    let scored = candidates
        .iter()
        .filter(|c| c.id != target.id)
        .map(|c| (c, similarity_score(target, c)));
    top_scored(scored, limit)
}

/// Items ordered by how many of `target_hashtags` they carry.
pub fn rank_by_hashtags<'a>(
    target_hashtags: &[String],
    candidates: &'a [Item],
    limit: usize,
) -> Vec<(&'a Item, f64)> {
    let scored = candidates
        .iter()
        .map(|c| (c, hashtag_match_score(target_hashtags, c)));
    top_scored(scored, limit)
}

fn top_scored<'a>(
    scored: impl Iterator<Item = (&'a Item, f64)>,
    limit: usize,
) -> Vec<(&'a Item, f64)> {
    let mut scored: Vec<(&Item, f64)> = scored.filter(|(_, s)| *s > 0.0).collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.0.created_at.cmp(&a.0.created_at))
    });
    scored.truncate(limit);
    scored
}
