//! Interaction Recorder
//!
//! Turns view / rewatch / engagement events into interaction records.
//!
//! ## Rules
//! - The first event for a `(user, item)` pair creates the record
//! - Watch duration only ever grows (`max(existing, new)`)
//! - Total duration is taken from the latest view event
//! - `commented`, `shared`, `rewatched` are sticky; `liked` toggles
//! - Every event recomputes the interest score

use crate::record::{self, EngagementKind};
use crate::store::InteractionStore;
use chrono::{DateTime, Utc};
use data_loader::{FeedError, InteractionKey, InteractionRecord, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct InteractionRecorder {
    store: Arc<dyn InteractionStore>,
}

impl InteractionRecorder {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn InteractionStore> {
        &self.store
    }

    /// Record that `user_id` watched `watch_seconds` of `item_id`.
    pub fn record_view(
        &self,
        user_id: &str,
        item_id: &str,
        watch_seconds: f64,
        total_seconds: f64,
    ) -> Result<InteractionRecord> {
        self.record_view_at(user_id, item_id, watch_seconds, total_seconds, Utc::now())
    }

    /// Like [`record_view`](Self::record_view) with an explicit event time.
    #[instrument(skip(self, at))]
    pub fn record_view_at(
        &self,
        user_id: &str,
        item_id: &str,
        watch_seconds: f64,
        total_seconds: f64,
        at: DateTime<Utc>,
    ) -> Result<InteractionRecord> {
        // NaN fails both comparisons, so test for the valid range
        if !(watch_seconds >= 0.0) {
            return Err(FeedError::invalid_input("watchDuration", watch_seconds));
        }
        if !(total_seconds >= 0.0) {
            return Err(FeedError::invalid_input("totalDuration", total_seconds));
        }

        let key = InteractionKey::new(user_id, item_id);
        let updated = self.store.upsert(key.clone(), &mut |existing| {
            let mut r = existing
                .cloned()
                .unwrap_or_else(|| InteractionRecord::new(&key, at));
            r.watch_duration_seconds = r.watch_duration_seconds.max(watch_seconds);
            r.total_duration_seconds = total_seconds;
            r.last_viewed_at = r.last_viewed_at.max(at);
            record::refresh_derived(&mut r);
            r
        });

        debug!(
            "view recorded: {:.1}% watched, interest {:.1}",
            updated.watch_percentage, updated.interest_score
        );
        Ok(updated)
    }

    /// Record that `user_id` started `item_id` again.
    pub fn record_rewatch(&self, user_id: &str, item_id: &str) -> InteractionRecord {
        self.record_rewatch_at(user_id, item_id, Utc::now())
    }

    #[instrument(skip(self, at))]
    pub fn record_rewatch_at(
        &self,
        user_id: &str,
        item_id: &str,
        at: DateTime<Utc>,
    ) -> InteractionRecord {
        let key = InteractionKey::new(user_id, item_id);
        self.store.upsert(key.clone(), &mut |existing| {
            let mut r = existing
                .cloned()
                .unwrap_or_else(|| InteractionRecord::new(&key, at));
            r.watch_count += 1;
            if r.watch_count > 1 {
                r.rewatched = true;
            }
            r.last_viewed_at = r.last_viewed_at.max(at);
            record::refresh_derived(&mut r);
            r
        })
    }

    /// Record a like/unlike, comment or share.
    pub fn record_engagement(
        &self,
        user_id: &str,
        item_id: &str,
        kind: EngagementKind,
    ) -> InteractionRecord {
        self.record_engagement_at(user_id, item_id, kind, Utc::now())
    }

    #[instrument(skip(self, at))]
    pub fn record_engagement_at(
        &self,
        user_id: &str,
        item_id: &str,
        kind: EngagementKind,
        at: DateTime<Utc>,
    ) -> InteractionRecord {
        let key = InteractionKey::new(user_id, item_id);
        self.store.upsert(key.clone(), &mut |existing| {
            let mut r = existing
                .cloned()
                .unwrap_or_else(|| InteractionRecord::new(&key, at));
            record::apply_engagement(&mut r, kind);
            r
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryInteractionStore;
    use chrono::{Duration, TimeZone};
    use rayon::prelude::*;

    fn create_test_recorder() -> InteractionRecorder {
        InteractionRecorder::new(Arc::new(InMemoryInteractionStore::new()))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_first_view_creates_record() {
        let recorder = create_test_recorder();
        let r = recorder.record_view_at("u1", "v1", 5.0, 10.0, t0()).unwrap();

        assert_eq!(r.watch_percentage, 50.0);
        assert!(!r.completed);
        assert_eq!(r.watch_count, 1);
        assert_eq!(r.interest_score, 50.0);
        assert_eq!(r.first_viewed_at, t0());
    }

    #[test]
    fn test_repeat_view_never_regresses() {
        let recorder = create_test_recorder();
        let first = recorder.record_view_at("u1", "v1", 3.0, 10.0, t0()).unwrap();
        let second = recorder
            .record_view_at("u1", "v1", 10.0, 10.0, t0() + Duration::seconds(30))
            .unwrap();

        assert_eq!(first.watch_percentage, 30.0);
        assert_eq!(second.watch_percentage, 100.0);
        assert!(second.completed);

        let third = recorder
            .record_view_at("u1", "v1", 2.0, 10.0, t0() + Duration::seconds(60))
            .unwrap();
        assert_eq!(third.watch_percentage, 100.0);
        assert_eq!(third.first_viewed_at, t0());
        assert_eq!(third.last_viewed_at, t0() + Duration::seconds(60));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let recorder = create_test_recorder();
        let result = recorder.record_view_at("u1", "v1", -1.0, 10.0, t0());
        assert!(matches!(result, Err(FeedError::InvalidInput { .. })));

        let result = recorder.record_view_at("u1", "v1", 1.0, f64::NAN, t0());
        assert!(result.is_err());
        assert!(recorder.store().get(&InteractionKey::new("u1", "v1")).is_none());
    }

    #[test]
    fn test_rewatch_sets_flag_and_bonus() {
        let recorder = create_test_recorder();
        recorder.record_view_at("u1", "v1", 8.0, 10.0, t0()).unwrap();
        let r = recorder.record_rewatch_at("u1", "v1", t0() + Duration::minutes(1));

        assert_eq!(r.watch_count, 2);
        assert!(r.rewatched);
        assert_eq!(r.interest_score, 80.0 + 75.0);
        assert_eq!(r.last_viewed_at, t0() + Duration::minutes(1));
    }

    #[test]
    fn test_engagement_without_view_creates_record() {
        let recorder = create_test_recorder();
        let r = recorder.record_engagement_at("u1", "v1", EngagementKind::Shared, t0());

        assert!(r.shared);
        assert_eq!(r.watch_count, 1);
        assert_eq!(r.interest_score, 150.0);
    }

    #[test]
    fn test_like_toggle() {
        let recorder = create_test_recorder();
        recorder.record_view_at("u1", "v1", 8.0, 10.0, t0()).unwrap();
        let liked = recorder.record_engagement_at("u1", "v1", EngagementKind::Liked(true), t0());
        assert_eq!(liked.interest_score, 130.0);

        let unliked = recorder.record_engagement_at("u1", "v1", EngagementKind::Liked(false), t0());
        assert_eq!(unliked.interest_score, 80.0);
    }

    #[test]
    fn test_concurrent_same_key_updates_are_not_lost() {
        let recorder = create_test_recorder();
        recorder.record_view_at("u1", "v1", 1.0, 100.0, t0()).unwrap();

        (0..200).into_par_iter().for_each(|i| {
            if i % 2 == 0 {
                recorder.record_rewatch_at("u1", "v1", t0());
            } else {
                recorder
                    .record_view_at("u1", "v1", (i % 100) as f64, 100.0, t0())
                    .unwrap();
            }
        });

        let r = recorder.store().get(&InteractionKey::new("u1", "v1")).unwrap();
        assert_eq!(r.watch_count, 101);
        assert_eq!(r.watch_duration_seconds, 99.0);
        assert!(r.rewatched);
    }
}
