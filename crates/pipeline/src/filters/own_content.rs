//! Filter to remove the viewer's own items.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Item;
use profile::ViewerContext;

/// Removes candidates authored by the viewer.
pub struct OwnContentFilter;

impl Filter for OwnContentFilter {
    fn name(&self) -> &str {
        "OwnContentFilter"
    }

    fn apply(&self, candidates: Vec<Item>, context: &ViewerContext) -> Result<Vec<Item>> {
        Ok(candidates
            .into_iter()
            .filter(|item| item.author_id != context.user_id)
            .collect())
    }
}
