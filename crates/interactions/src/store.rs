//! Repository interface for interaction records, plus an in-memory store.
//!
//! The recorder never touches storage directly; it goes through
//! `InteractionStore`, so every scoring function can be exercised without a
//! database.

use crate::record;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use data_loader::{InteractionKey, InteractionRecord};
use std::cmp::Ordering;

/// Storage port for interaction records.
///
/// Implementations must make `upsert` atomic per key: two concurrent
/// upserts for the same `(user, item)` may not lose either update.
/// Upserts on different keys need no coordination.
pub trait InteractionStore: Send + Sync {
    fn get(&self, key: &InteractionKey) -> Option<InteractionRecord>;

    /// Read-modify-write the record under `key`.
    ///
    /// `update` receives the stored record (`None` if absent) and returns
    /// the record to store. The stored value is returned.
    fn upsert(
        &self,
        key: InteractionKey,
        update: &mut dyn FnMut(Option<&InteractionRecord>) -> InteractionRecord,
    ) -> InteractionRecord;

    /// Most recent `limit` records of a user, newest `last_viewed_at` first
    fn recent_for_user(&self, user_id: &str, limit: usize) -> Vec<InteractionRecord>;

    /// Top `limit` records of a user with `interest_score >= threshold`,
    /// highest score first
    fn top_interests_for_user(
        &self,
        user_id: &str,
        threshold: f64,
        limit: usize,
    ) -> Vec<InteractionRecord>;

    /// Every record of a user, in no particular order
    fn all_for_user(&self, user_id: &str) -> Vec<InteractionRecord>;
}

/// Sharded in-memory store.
///
/// `DashMap::entry` holds the shard's write lock for the whole
/// read-modify-write, which serializes same-key updates.
#[derive(Debug, Default)]
pub struct InMemoryInteractionStore {
    records: DashMap<InteractionKey, InteractionRecord>,
}

impl InMemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from previously persisted records.
    ///
    /// Duplicate keys are reconciled with [`record::merge`].
    pub fn from_records(records: impl IntoIterator<Item = InteractionRecord>) -> Self {
        let store = Self::new();
        for r in records {
            store.merge_upsert(r);
        }
        store
    }

    /// Write a full record, reconciling with whatever is stored.
    ///
    /// This is the path for writers that build a record offline and race
    /// with other writers: the conflict is resolved, never reported.
    pub fn merge_upsert(&self, incoming: InteractionRecord) -> InteractionRecord {
        match self.records.entry(incoming.key()) {
            Entry::Occupied(mut entry) => {
                let merged = record::merge(entry.get(), &incoming);
                entry.insert(merged.clone());
                merged
            }
            Entry::Vacant(entry) => {
                let mut fresh = incoming;
                record::refresh_derived(&mut fresh);
                entry.insert(fresh.clone());
                fresh
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn collect_user(&self, user_id: &str) -> Vec<InteractionRecord> {
        self.records
            .iter()
            .filter(|entry| entry.key().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl InteractionStore for InMemoryInteractionStore {
    fn get(&self, key: &InteractionKey) -> Option<InteractionRecord> {
        self.records.get(key).map(|r| r.value().clone())
    }

    fn upsert(
        &self,
        key: InteractionKey,
        update: &mut dyn FnMut(Option<&InteractionRecord>) -> InteractionRecord,
    ) -> InteractionRecord {
        match self.records.entry(key) {
            Entry::Occupied(mut entry) => {
                let next = update(Some(entry.get()));
                entry.insert(next.clone());
                next
            }
            Entry::Vacant(entry) => {
                let next = update(None);
                entry.insert(next.clone());
                next
            }
        }
    }

    fn recent_for_user(&self, user_id: &str, limit: usize) -> Vec<InteractionRecord> {
        let mut records = self.collect_user(user_id);
        records.sort_by(|a, b| {
            b.last_viewed_at
                .cmp(&a.last_viewed_at)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        records.truncate(limit);
        records
    }

    fn top_interests_for_user(
        &self,
        user_id: &str,
        threshold: f64,
        limit: usize,
    ) -> Vec<InteractionRecord> {
        let mut records: Vec<InteractionRecord> = self
            .collect_user(user_id)
            .into_iter()
            .filter(|r| r.interest_score >= threshold)
            .collect();
        records.sort_by(|a, b| {
            b.interest_score
                .partial_cmp(&a.interest_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.last_viewed_at.cmp(&a.last_viewed_at))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        records.truncate(limit);
        records
    }

    fn all_for_user(&self, user_id: &str) -> Vec<InteractionRecord> {
        self.collect_user(user_id)
    }
}
