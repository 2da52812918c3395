//! Filter to remove items the viewer has seen recently.
//!
//! `ViewerContext.recent_views` already holds only the most recent window
//! (50 items), so anything older can be recommended again.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Item;
use profile::ViewerContext;

/// Removes candidates among the viewer's recent views.
///
/// ## Algorithm
/// Builds a HashSet over the recent-view window for O(1) lookups.
pub struct RecentlyViewedFilter;

impl Filter for RecentlyViewedFilter {
    fn name(&self) -> &str {
        "RecentlyViewedFilter"
    }

    fn apply(&self, candidates: Vec<Item>, context: &ViewerContext) -> Result<Vec<Item>> {
        let recent = context.recent_view_set();
        let filtered: Vec<Item> = candidates
            .into_iter()
            .filter(|item| !recent.contains(item.id.as_str()))
            .collect();
        Ok(filtered)
    }
}
