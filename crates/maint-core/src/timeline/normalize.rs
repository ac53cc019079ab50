//! Raw fact to timeline entry mapping.

use super::entry::{EntryKind, TimelineEntry};
use super::fact::{FactKind, RawFact};
use crate::core::{CoreError, CoreResult};

/// Entry kind a fact is reported as, or `None` for facts that never reach
/// the timeline on their own.
#[must_use]
pub const fn entry_kind(kind: FactKind) -> Option<EntryKind> {
    match kind {
        FactKind::ProjectCreated => Some(EntryKind::ProjectCreated),
        FactKind::RequestCreated => Some(EntryKind::ReleaseRequestCreated),
        FactKind::LinkedRequestCreated => Some(EntryKind::ReleaseRequestRequestCreated),
        FactKind::LinkedRequestAccepted => Some(EntryKind::ReleaseRequestRequestAccepted),
        FactKind::ReviewOpened => Some(EntryKind::ReviewOpened),
        FactKind::ReviewAccepted => Some(EntryKind::ReviewAccepted),
        FactKind::ReviewDeclined => Some(EntryKind::ReviewDeclined),
        FactKind::IssueCreated => Some(EntryKind::IssueCreated),
        // consumed by the review chain resolver
        FactKind::ReviewAssigned => None,
    }
}

/// Convert one fact into its timeline entry.
pub fn normalize(fact: RawFact) -> CoreResult<TimelineEntry> {
    let Some(kind) = entry_kind(fact.kind) else {
        tracing::debug!(
            kind = fact.kind.as_str(),
            record = fact.source.record_id(),
            "fact has no timeline entry"
        );
        return Err(CoreError::UnmappedFact {
            kind: fact.kind.as_str(),
        });
    };
    let who = match kind {
        EntryKind::ProjectCreated | EntryKind::IssueCreated => None,
        _ => fact.actor,
    };
    let issue = match kind {
        EntryKind::IssueCreated => fact.issue,
        _ => None,
    };
    Ok(TimelineEntry::new(kind, fact.when, who, issue))
}

/// Convert every fact, failing on the first one without a mapping.
pub fn normalize_all(facts: Vec<RawFact>) -> CoreResult<Vec<TimelineEntry>> {
    facts.into_iter().map(normalize).collect()
}
