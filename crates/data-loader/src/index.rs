//! Building an `ItemCatalog` from a fixture directory.

use crate::error::{FeedError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

impl ItemCatalog {
    /// Load `items.json`, `follows.json` and (optionally) `interactions.json`
    /// from `data_dir`.
    ///
    /// Steps:
    /// 1. Parse items and follows in parallel
    /// 2. Parse interactions if the file is present
    /// 3. Build the catalog and validate references
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading feed fixtures from {:?}", data_dir);

        let items_path = data_dir.join("items.json");
        let follows_path = data_dir.join("follows.json");
        let interactions_path = data_dir.join("interactions.json");

        let (items, follows) = rayon::join(
            || parser::parse_items(&items_path),
            || parser::parse_follows(&follows_path),
        );
        let items = items?;
        let follows = follows?;

        let interactions = if interactions_path.exists() {
            parser::parse_interactions(&interactions_path)?
        } else {
            debug!("No interactions.json in {:?}", data_dir);
            Vec::new()
        };

        info!(
            "Loaded {} items, {} follow edges, {} interactions",
            items.len(),
            follows.len(),
            interactions.len()
        );

        let mut catalog = ItemCatalog::new();
        for item in items {
            catalog.insert_item(item);
        }
        for (viewer, author) in follows {
            catalog.follow(viewer, author);
        }
        for record in interactions {
            catalog.insert_interaction(record);
        }

        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that every interaction points at a known item and carries sane
    /// durations.
    ///
    /// Follow edges are not checked: authors may follow users with no
    /// items in the current candidate set.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<InteractionKey> = HashSet::new();
        for record in &self.interactions {
            if !self.items.contains_key(&record.item_id) {
                return Err(FeedError::MissingReference {
                    entity: "Item".to_string(),
                    id: record.item_id.clone(),
                });
            }
            if record.watch_duration_seconds < 0.0 {
                return Err(FeedError::invalid_input(
                    "watchDurationSeconds",
                    record.watch_duration_seconds,
                ));
            }
            if record.total_duration_seconds < 0.0 {
                return Err(FeedError::invalid_input(
                    "totalDurationSeconds",
                    record.total_duration_seconds,
                ));
            }
            if !seen.insert(record.key()) {
                return Err(FeedError::invalid_input(
                    "interaction",
                    format!("duplicate key {}/{}", record.user_id, record.item_id),
                ));
            }
        }
        Ok(())
    }
}
