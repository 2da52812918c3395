//! Parsers for the JSON fixture files.
//!
//! - items.json: `[ { "id": .., "authorId": .., "createdAt": .., ... } ]`
//! - follows.json: `{ "viewer": ["author", ...] }`
//! - interactions.json: `[ { "userId": .., "itemId": .., ... } ]`

use crate::error::{FeedError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(FeedError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| FeedError::ParseError {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Parse the items file
pub fn parse_items(path: &Path) -> Result<Vec<Item>> {
    read_json(path)
}

/// Parse the follow graph file into (viewer, author) edges
pub fn parse_follows(path: &Path) -> Result<Vec<(UserId, UserId)>> {
    let graph: HashMap<UserId, Vec<UserId>> = read_json(path)?;
    let mut edges: Vec<(UserId, UserId)> = graph
        .into_iter()
        .flat_map(|(viewer, authors)| {
            authors
                .into_iter()
                .map(move |author| (viewer.clone(), author))
        })
        .collect();
    // HashMap iteration order is random; keep loading reproducible
    edges.sort();
    Ok(edges)
}

/// Parse the interactions file
pub fn parse_interactions(path: &Path) -> Result<Vec<InteractionRecord>> {
    read_json(path)
}
