//! Relationship classification: is an item written by someone the viewer follows.

use data_loader::{Item, UserId};
use std::collections::HashSet;

pub fn is_followed(item: &Item, following: &HashSet<UserId>) -> bool {
    following.contains(&item.author_id)
}
