//! Viewer-side types shared by the ranking pipeline.

use data_loader::{InteractionRecord, ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A viewer's top interests, derived from high-interest interactions.
///
/// Labels are stored normalized (see [`data_loader::normalize_label`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub user_id: UserId,
    /// Up to 5 hashtags, most frequent first
    pub interests: Vec<String>,
    /// Up to 3 moods, most frequent first
    pub preferred_moods: Vec<String>,
}

impl PreferenceProfile {
    pub fn empty(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.interests.is_empty() && self.preferred_moods.is_empty()
    }
}

/// A past interaction joined with the categories of the item it refers to.
#[derive(Debug, Clone)]
pub struct PastInteraction {
    pub record: InteractionRecord,
    /// Normalized categories of the interacted item
    pub categories: Vec<String>,
}

/// Everything the short recommender needs to know about the viewer.
///
/// Gathered once per request so scoring never goes back to the stores.
#[derive(Debug, Clone, Default)]
pub struct ViewerContext {
    pub user_id: UserId,
    /// Authors the viewer follows
    pub following: HashSet<UserId>,
    pub profile: PreferenceProfile,
    /// Most recently viewed items, newest first
    pub recent_views: Vec<ItemId>,
    /// Interaction history with item categories attached
    pub history: Vec<PastInteraction>,
}

impl ViewerContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        let user_id = user_id.into();
        Self {
            profile: PreferenceProfile::empty(user_id.clone()),
            user_id,
            ..Default::default()
        }
    }

    /// Items the viewer saw recently, for O(1) exclusion checks
    pub fn recent_view_set(&self) -> HashSet<&str> {
        self.recent_views.iter().map(String::as_str).collect()
    }
}
