//! Ordering of normalized entries into the final timeline.

use super::entry::{Timeline, TimelineEntry};

/// Order entries oldest first.
///
/// Entries with equal timestamps are ordered by kind priority and then keep
/// the order they were given in, so the same input always produces the same
/// timeline.
#[must_use]
pub fn merge(mut entries: Vec<TimelineEntry>) -> Timeline {
    // stable: emission order breaks the remaining ties
    entries.sort_by_key(|e| (e.when(), e.kind().priority()));
    Timeline::from_sorted(entries)
}
