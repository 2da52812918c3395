//! # Data Loader Crate
//!
//! Shared data model for feed ranking, plus loading of fixture data.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Item, InteractionRecord, ItemCatalog)
//! - **parser**: Parse the JSON fixture files into Rust structs
//! - **index**: Build and validate an `ItemCatalog` from a directory
//! - **error**: `FeedError`, used by every ranking crate
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::ItemCatalog;
//! use std::path::Path;
//!
//! let catalog = ItemCatalog::load_from_dir(Path::new("data/demo"))?;
//! let following = catalog.following("carol");
//! println!("carol follows {} authors", following.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{FeedError, Result};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    Item,
    InteractionKey,
    InteractionRecord,
    ItemCatalog,
    // Helpers
    normalize_label,
};
