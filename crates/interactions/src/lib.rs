//! # Interactions Crate
//!
//! Per-(user, item) interaction state and the interest score that feeds
//! the preference profile.
//!
//! ## Components
//! - **record**: derived fields, the interest-score formula, conflict merge
//! - **store**: `InteractionStore` repository trait and a `DashMap`-backed
//!   in-memory implementation
//! - **recorder**: `InteractionRecorder`, the event entry points
//!
//! ## Example Usage
//!
//! ```ignore
//! use interactions::{InMemoryInteractionStore, InteractionRecorder, EngagementKind};
//! use std::sync::Arc;
//!
//! let recorder = InteractionRecorder::new(Arc::new(InMemoryInteractionStore::new()));
//! recorder.record_view("u1", "short-9", 8.0, 10.0)?;
//! let record = recorder.record_engagement("u1", "short-9", EngagementKind::Liked(true));
//! assert_eq!(record.interest_score, 130.0);
//! ```

pub mod record;
pub mod store;
pub mod recorder;

pub use record::{EngagementKind, interest_score};
pub use recorder::InteractionRecorder;
pub use store::{InMemoryInteractionStore, InteractionStore};
