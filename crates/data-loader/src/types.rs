//! Core domain types for feed ranking.
//!
//! Items and follow edges are owned by the storage collaborator; the
//! ranking crates only ever read them. Interaction records are the one
//! piece of mutable state and are written through the `interactions` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (viewer or author)
pub type UserId = String;

/// Unique identifier for a feed item (post, ad, shipment or short video)
pub type ItemId = String;

// =============================================================================
// Item
// =============================================================================

/// A candidate item as supplied by the candidate fetch.
///
/// Every label list is optional in the source data; absent lists
/// deserialize as empty and contribute nothing to similarity or match scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reaction_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub share_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
}

impl Item {
    /// Create an item with no engagement and no labels.
    pub fn new(id: impl Into<ItemId>, author_id: impl Into<UserId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            created_at,
            reaction_count: 0,
            comment_count: 0,
            share_count: 0,
            view_count: 0,
            tags: Vec::new(),
            categories: Vec::new(),
            hashtags: Vec::new(),
            topics: Vec::new(),
            mood: None,
            target_audience: None,
        }
    }

    /// Age of the item in fractional hours relative to `now`.
    ///
    /// Items stamped in the future are treated as brand new (age 0).
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.created_at).num_milliseconds();
        (millis as f64 / 3_600_000.0).max(0.0)
    }
}

// =============================================================================
// Interaction Record
// =============================================================================

/// Key of an interaction record: one viewer, one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionKey {
    pub user_id: UserId,
    pub item_id: ItemId,
}

impl InteractionKey {
    pub fn new(user_id: impl Into<UserId>, item_id: impl Into<ItemId>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// Per-(user, item) viewing and engagement state.
///
/// Invariants maintained by the recorder:
/// - `watch_percentage = min(watch / total * 100, 100)`
/// - `completed` iff `watch_percentage >= 80`
/// - `commented`, `shared`, `rewatched` never go back to false
/// - `watch_count >= 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub watch_duration_seconds: f64,
    pub total_duration_seconds: f64,
    #[serde(default)]
    pub watch_percentage: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub commented: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub rewatched: bool,
    #[serde(default = "default_watch_count")]
    pub watch_count: u32,
    #[serde(default)]
    pub interest_score: f64,
    pub first_viewed_at: DateTime<Utc>,
    pub last_viewed_at: DateTime<Utc>,
}

fn default_watch_count() -> u32 {
    1
}

impl InteractionRecord {
    /// A fresh record with nothing watched yet.
    pub fn new(key: &InteractionKey, at: DateTime<Utc>) -> Self {
        Self {
            user_id: key.user_id.clone(),
            item_id: key.item_id.clone(),
            watch_duration_seconds: 0.0,
            total_duration_seconds: 0.0,
            watch_percentage: 0.0,
            completed: false,
            liked: false,
            commented: false,
            shared: false,
            rewatched: false,
            watch_count: 1,
            interest_score: 0.0,
            first_viewed_at: at,
            last_viewed_at: at,
        }
    }

    pub fn key(&self) -> InteractionKey {
        InteractionKey::new(self.user_id.clone(), self.item_id.clone())
    }
}

// =============================================================================
// ItemCatalog - in-memory view of the collaborator data
// =============================================================================

/// Holds candidate items and the follow graph.
///
/// Stands in for the candidate fetch and follow-graph collaborators: a
/// caller (or the CLI) loads it once and hands out references.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    pub(crate) items: HashMap<ItemId, Item>,
    /// Insertion order, so `all_items` is stable across runs
    pub(crate) item_order: Vec<ItemId>,
    /// Items grouped by author
    pub(crate) author_index: HashMap<UserId, Vec<ItemId>>,
    /// viewer -> followed authors
    pub(crate) follows: HashMap<UserId, HashSet<UserId>>,
    /// Interaction history loaded alongside the items, if any
    pub(crate) interactions: Vec<InteractionRecord>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an item by ID
    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// All items in insertion order
    pub fn all_items(&self) -> Vec<&Item> {
        self.item_order
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// Items written by `author_id`, in insertion order
    pub fn items_by_author(&self, author_id: &str) -> Vec<&Item> {
        self.author_index
            .get(author_id)
            .map(|ids| ids.iter().filter_map(|id| self.items.get(id)).collect())
            .unwrap_or_default()
    }

    /// Authors followed by `viewer`. Empty if the viewer follows no one.
    pub fn following(&self, viewer: &str) -> HashSet<UserId> {
        self.follows.get(viewer).cloned().unwrap_or_default()
    }

    /// Every viewer known to the catalog (follow graph or interaction
    /// history), sorted
    pub fn viewers(&self) -> Vec<UserId> {
        let mut viewers: Vec<UserId> = self
            .follows
            .keys()
            .chain(self.interactions.iter().map(|r| &r.user_id))
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        viewers.sort();
        viewers
    }

    /// Interaction history loaded with the catalog
    pub fn interactions(&self) -> &[InteractionRecord] {
        &self.interactions
    }

    /// Insert (or replace) an item
    pub fn insert_item(&mut self, item: Item) {
        if !self.items.contains_key(&item.id) {
            self.item_order.push(item.id.clone());
            self.author_index
                .entry(item.author_id.clone())
                .or_default()
                .push(item.id.clone());
        }
        self.items.insert(item.id.clone(), item);
    }

    /// Record that `viewer` follows `author`
    pub fn follow(&mut self, viewer: impl Into<UserId>, author: impl Into<UserId>) {
        self.follows
            .entry(viewer.into())
            .or_default()
            .insert(author.into());
    }

    pub fn insert_interaction(&mut self, record: InteractionRecord) {
        self.interactions.push(record);
    }

    /// (items, viewers with follow edges, interactions)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.items.len(), self.follows.len(), self.interactions.len())
    }
}

/// Canonical form of a tag, category, hashtag, topic or mood label:
/// trimmed, lowercased, without a leading `#`.
pub fn normalize_label(label: &str) -> String {
    label.trim().trim_start_matches('#').to_lowercase()
}
