//! Preference Profile Builder
//!
//! ## Algorithm
//! 1. Keep interactions with interest score >= 100
//! 2. Take the 20 highest by interest score
//! 3. Count how many of those items carry each hashtag (and mood)
//! 4. Keep the 5 most frequent hashtags and 3 most frequent moods;
//!    equal counts keep first-seen order

use crate::types::PreferenceProfile;
use data_loader::{InteractionRecord, ItemCatalog, normalize_label};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

/// Minimum interest score for an interaction to shape the profile
pub const HIGH_INTEREST_THRESHOLD: f64 = 100.0;
/// How many of the strongest interactions are considered
pub const PROFILE_HISTORY_LIMIT: usize = 20;
pub const TOP_INTERESTS: usize = 5;
pub const TOP_MOODS: usize = 3;

/// Build a viewer's preference profile from their interaction history.
///
/// Records of other users and records pointing at items missing from the
/// catalog are skipped. An empty history yields an empty profile.
#[instrument(skip(history, catalog), fields(history_len = history.len()))]
pub fn build_profile(
    user_id: &str,
    history: &[InteractionRecord],
    catalog: &ItemCatalog,
) -> PreferenceProfile {
    let mut strongest: Vec<&InteractionRecord> = history
        .iter()
        .filter(|r| r.user_id == user_id && r.interest_score >= HIGH_INTEREST_THRESHOLD)
        .collect();
    // stable: equal scores keep history order
    strongest.sort_by(|a, b| {
        b.interest_score
            .partial_cmp(&a.interest_score)
            .unwrap_or(Ordering::Equal)
    });
    strongest.truncate(PROFILE_HISTORY_LIMIT);

    let mut hashtags = FrequencyTally::default();
    let mut moods = FrequencyTally::default();
    for record in strongest {
        let Some(item) = catalog.get_item(&record.item_id) else {
            warn!("interaction references unknown item {}", record.item_id);
            continue;
        };
        let mut seen: HashSet<String> = HashSet::new();
        for tag in &item.hashtags {
            let label = normalize_label(tag);
            if !label.is_empty() && seen.insert(label.clone()) {
                hashtags.add(label);
            }
        }
        if let Some(mood) = &item.mood {
            let label = normalize_label(mood);
            if !label.is_empty() {
                moods.add(label);
            }
        }
    }

    let profile = PreferenceProfile {
        user_id: user_id.to_string(),
        interests: hashtags.top(TOP_INTERESTS),
        preferred_moods: moods.top(TOP_MOODS),
    };
    debug!(
        "profile built: {} interests, {} moods",
        profile.interests.len(),
        profile.preferred_moods.len()
    );
    profile
}

/// Counts labels while remembering the order they were first seen in.
#[derive(Default)]
struct FrequencyTally {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl FrequencyTally {
    fn add(&mut self, label: String) {
        let count = self.counts.entry(label.clone()).or_insert(0);
        if *count == 0 {
            self.order.push(label);
        }
        *count += 1;
    }

    fn top(self, n: usize) -> Vec<String> {
        let mut ranked: Vec<(String, usize)> = self
            .order
            .into_iter()
            .map(|label| {
                let count = self.counts.get(&label).copied().unwrap_or(0);
                (label, count)
            })
            .collect();
        // stable sort keeps first-seen order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(label, _)| label).collect()
    }
}
