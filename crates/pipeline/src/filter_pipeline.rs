//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use crate::filters::{OwnContentFilter, RecentlyViewedFilter};
use anyhow::{Context, Result};
use data_loader::Item;
use profile::ViewerContext;
use tracing::debug;

/// Chains exclusion filters, applied in insertion order.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(OwnContentFilter)
///     .add_filter(RecentlyViewedFilter);
///
/// let filtered = pipeline.apply(candidates, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The exclusions every short recommendation applies: the viewer's own
    /// items, then anything in the recent-view window.
    pub fn for_shorts() -> Self {
        Self::new()
            .add_filter(OwnContentFilter)
            .add_filter(RecentlyViewedFilter)
    }

    /// Add a filter to the end of the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter names in application order
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter in turn, logging how many candidates each removed.
    pub fn apply(&self, candidates: Vec<Item>, context: &ViewerContext) -> Result<Vec<Item>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter
                .apply(current, context)
                .with_context(|| format!("filter {} failed", filter.name()))?;
            debug!(
                "{} removed {} of {} candidates",
                filter.name(),
                before - current.len(),
                before
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
