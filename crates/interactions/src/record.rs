//! Derived fields of an interaction record and the interest-score formula.

use data_loader::InteractionRecord;

/// Watch percentage at or above which a view counts as completed
pub const COMPLETION_THRESHOLD: f64 = 80.0;

pub const LIKE_BONUS: f64 = 50.0;
pub const COMMENT_BONUS: f64 = 100.0;
pub const SHARE_BONUS: f64 = 150.0;
pub const REWATCH_BONUS: f64 = 75.0;

/// An engagement event on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    /// Like or unlike; the only flag that can be reset
    Liked(bool),
    Commented,
    Shared,
}

/// `min(watch / total * 100, 100)`, or 0 when the total duration is unknown.
pub fn watch_percentage(watch_seconds: f64, total_seconds: f64) -> f64 {
    if total_seconds <= 0.0 {
        return 0.0;
    }
    (watch_seconds / total_seconds * 100.0).min(100.0)
}

/// Interest score of a record:
/// `watch% + liked·50 + commented·100 + shared·150 + rewatched·75`
pub fn interest_score(record: &InteractionRecord) -> f64 {
    let mut score = record.watch_percentage;
    if record.liked {
        score += LIKE_BONUS;
    }
    if record.commented {
        score += COMMENT_BONUS;
    }
    if record.shared {
        score += SHARE_BONUS;
    }
    if record.rewatched {
        score += REWATCH_BONUS;
    }
    score
}

/// Recompute watch percentage, completion and interest score from the raw fields.
pub fn refresh_derived(record: &mut InteractionRecord) {
    record.watch_percentage =
        watch_percentage(record.watch_duration_seconds, record.total_duration_seconds);
    record.completed = record.watch_percentage >= COMPLETION_THRESHOLD;
    record.interest_score = interest_score(record);
}

/// Apply an engagement event in place.
pub fn apply_engagement(record: &mut InteractionRecord, kind: EngagementKind) {
    match kind {
        EngagementKind::Liked(liked) => record.liked = liked,
        EngagementKind::Commented => record.commented = true,
        EngagementKind::Shared => record.shared = true,
    }
    refresh_derived(record);
}

/// Reconcile two versions of the same record written concurrently.
///
/// Sticky flags are OR-ed, watch duration and watch count take the max,
/// the view window widens to cover both. `liked` is togglable, so the
/// incoming value wins.
pub fn merge(current: &InteractionRecord, incoming: &InteractionRecord) -> InteractionRecord {
    let mut merged = incoming.clone();
    merged.watch_duration_seconds = current
        .watch_duration_seconds
        .max(incoming.watch_duration_seconds);
    if incoming.total_duration_seconds <= 0.0 {
        merged.total_duration_seconds = current.total_duration_seconds;
    }
    merged.commented = current.commented || incoming.commented;
    merged.shared = current.shared || incoming.shared;
    merged.rewatched = current.rewatched || incoming.rewatched;
    merged.watch_count = current.watch_count.max(incoming.watch_count);
    merged.first_viewed_at = current.first_viewed_at.min(incoming.first_viewed_at);
    merged.last_viewed_at = current.last_viewed_at.max(incoming.last_viewed_at);
    refresh_derived(&mut merged);
    merged
}
