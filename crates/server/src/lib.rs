//! Server crate for the feed-rank engine.
//!
//! This crate contains the orchestrator that wires the catalog, the
//! interaction store and the ranking pipeline behind async entry points.

pub mod orchestrator;

pub use orchestrator::{RecommendationOrchestrator, RelatedItem};
