//! # Profile Crate
//!
//! Viewer-side inputs for short-video recommendation.
//!
//! ## Components
//!
//! ### Preference Profile Builder
//! Derives a viewer's top hashtags (and moods) from their strongest
//! interactions: interest score >= 100, top 20, top 5 by frequency.
//!
//! ### Viewer Context
//! Bundles follows, recent views, the profile and category-joined history
//! so the recommender scores without touching any store.
//!
//! ## Example Usage
//!
//! ```ignore
//! use profile::build_viewer_context;
//!
//! let context = build_viewer_context(&catalog, store.as_ref(), "u1");
//! println!("top interests: {:?}", context.profile.interests);
//! ```

pub mod types;
pub mod preference;
pub mod viewer_context;

pub use types::{PastInteraction, PreferenceProfile, ViewerContext};
pub use preference::build_profile;
pub use viewer_context::build_viewer_context;
