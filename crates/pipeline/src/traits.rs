//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible exclusion rules to be applied to candidate sets.

use anyhow::Result;
use data_loader::Item;
use profile::ViewerContext;

/// Core trait for filtering candidates.
///
/// - `Send + Sync` so filters can be shared across request threads
/// - Filters take ownership of the candidates and return the survivors
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `context` - Viewer context with follows, recent views and profile
    fn apply(&self, candidates: Vec<Item>, context: &ViewerContext) -> Result<Vec<Item>>;
}
