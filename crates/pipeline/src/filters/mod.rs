//! Filter implementations for the candidate pipeline.
//!
//! This module contains the concrete filters that can be composed
//! into a FilterPipeline.

pub mod own_content;
pub mod recently_viewed;

// Re-export for convenience
pub use own_content::OwnContentFilter;
pub use recently_viewed::RecentlyViewedFilter;
