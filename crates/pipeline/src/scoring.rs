//! Engagement & time scoring for feed candidates.
//!
//! All functions are pure; "now" is always passed in so a ranking is
//! reproducible for a fixed clock.

use chrono::{DateTime, Utc};
use data_loader::Item;

pub const TIME_WEIGHT: f64 = 0.3;
pub const ENGAGEMENT_WEIGHT: f64 = 0.4;
pub const FOLLOW_WEIGHT: f64 = 0.3;
/// Relationship score of an item from a followed author
pub const FOLLOW_BOOST: f64 = 30.0;

/// `reactions * 2 + comments * 3`.
///
/// Shares are deliberately not counted here; the short recommender's
/// popularity signal weighs them separately.
pub fn engagement_score(item: &Item) -> f64 {
    item.reaction_count as f64 * 2.0 + item.comment_count as f64 * 3.0
}

/// Recency decay for an item `hours` old.
///
/// | age (h)      | score                        |
/// |--------------|------------------------------|
/// | 0 – 24       | 100 − 2h          (100 → 52) |
/// | 24 – 72      | 50 − (h − 24)/2   (50 → 26)  |
/// | 72 – 168     | 25 − (h − 72)/10  (25 → 15)  |
/// | 168 and over | max(1, 15 − (h − 168)/100)   |
///
/// Each band includes its upper bound except the third, so the boundary
/// values are 100, 52, 26 and 15.
pub fn time_score_hours(hours: f64) -> f64 {
    let h = hours.max(0.0);
    if h <= 24.0 {
        100.0 - 2.0 * h
    } else if h <= 72.0 {
        50.0 - (h - 24.0) / 2.0
    } else if h < 168.0 {
        25.0 - (h - 72.0) / 10.0
    } else {
        (15.0 - (h - 168.0) / 100.0).max(1.0)
    }
}

/// Recency decay of an item created at `created_at`, evaluated at `now`.
pub fn time_score(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds();
    time_score_hours(millis as f64 / 3_600_000.0)
}

/// `0.3 * time + 0.4 * engagement + 0.3 * (followed ? 30 : 0)`
pub fn feed_score(item: &Item, is_followed: bool, now: DateTime<Utc>) -> f64 {
    let relationship = if is_followed { FOLLOW_BOOST } else { 0.0 };
    TIME_WEIGHT * time_score(item.created_at, now)
        + ENGAGEMENT_WEIGHT * engagement_score(item)
        + FOLLOW_WEIGHT * relationship
}
