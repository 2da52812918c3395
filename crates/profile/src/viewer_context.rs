//! Helper to build a ViewerContext from the catalog and interaction store
//!
//! Gathers everything the short recommender needs in one pass:
//! - authors the viewer follows
//! - the 50 most recent views (for exclusion)
//! - the preference profile
//! - past interactions joined with item categories

use crate::preference::{HIGH_INTEREST_THRESHOLD, PROFILE_HISTORY_LIMIT, build_profile};
use crate::types::{PastInteraction, ViewerContext};
use data_loader::{ItemCatalog, normalize_label};
use interactions::InteractionStore;
use tracing::{debug, instrument};

/// How many recent views are excluded from short recommendations
pub const RECENT_VIEW_WINDOW: usize = 50;

/// Build a ViewerContext for `user_id`.
///
/// A viewer with no follows and no history gets an empty context, not an
/// error. Interactions on items unknown to the catalog are dropped from the
/// joined history.
#[instrument(skip(catalog, store))]
pub fn build_viewer_context(
    catalog: &ItemCatalog,
    store: &dyn InteractionStore,
    user_id: &str,
) -> ViewerContext {
    let mut context = ViewerContext::new(user_id);
    context.following = catalog.following(user_id);

    context.recent_views = store
        .recent_for_user(user_id, RECENT_VIEW_WINDOW)
        .into_iter()
        .map(|r| r.item_id)
        .collect();

    let strongest =
        store.top_interests_for_user(user_id, HIGH_INTEREST_THRESHOLD, PROFILE_HISTORY_LIMIT);
    context.profile = build_profile(user_id, &strongest, catalog);

    context.history = store
        .all_for_user(user_id)
        .into_iter()
        .filter_map(|record| {
            let item = catalog.get_item(&record.item_id)?;
            let categories = item.categories.iter().map(|c| normalize_label(c)).collect();
            Some(PastInteraction { record, categories })
        })
        .collect();

    debug!(
        "viewer context: {} follows, {} recent views, {} past interactions",
        context.following.len(),
        context.recent_views.len(),
        context.history.len()
    );
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use data_loader::Item;
    use interactions::{EngagementKind, InMemoryInteractionStore, InteractionRecorder};
    use std::sync::Arc;

    fn create_test_setup() -> (ItemCatalog, InteractionRecorder) {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut catalog = ItemCatalog::new();
        for i in 0..60 {
            let mut item = Item::new(format!("v{}", i), "creator", base);
            item.categories = vec!["Comedy".to_string()];
            item.hashtags = vec!["laughs".to_string()];
            catalog.insert_item(item);
        }
        catalog.follow("u1", "creator");

        let recorder = InteractionRecorder::new(Arc::new(InMemoryInteractionStore::new()));
        for i in 0..60 {
            recorder
                .record_view_at("u1", &format!("v{}", i), 9.0, 10.0, base + Duration::minutes(i))
                .unwrap();
        }
        recorder.record_engagement_at("u1", "v3", EngagementKind::Shared, base);
        (catalog, recorder)
    }

    #[test]
    fn test_build_viewer_context() {
        let (catalog, recorder) = create_test_setup();
        let context = build_viewer_context(&catalog, recorder.store().as_ref(), "u1");

        assert_eq!(context.user_id, "u1");
        assert!(context.following.contains("creator"));
        assert_eq!(context.recent_views.len(), RECENT_VIEW_WINDOW);
        assert_eq!(context.recent_views[0], "v59");
        assert!(!context.recent_view_set().contains("v5"));
        assert_eq!(context.history.len(), 60);
        assert_eq!(context.history[0].categories, vec!["comedy"]);
        // only v3 crosses the high-interest threshold (90 + 150)
        assert_eq!(context.profile.interests, vec!["laughs"]);
    }

    #[test]
    fn test_unknown_viewer() {
        let (catalog, recorder) = create_test_setup();
        let context = build_viewer_context(&catalog, recorder.store().as_ref(), "nobody");

        assert!(context.following.is_empty());
        assert!(context.recent_views.is_empty());
        assert!(context.profile.is_empty());
    }
}
