//! Timeline entries and the ordered sequence they are returned in.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    ProjectCreated,
    ReleaseRequestCreated,
    ReleaseRequestRequestCreated,
    ReleaseRequestRequestAccepted,
    ReviewOpened,
    ReviewAccepted,
    ReviewDeclined,
    IssueCreated,
}

impl EntryKind {
    pub const ALL: [Self; 8] = [
        Self::ProjectCreated,
        Self::ReleaseRequestCreated,
        Self::ReleaseRequestRequestCreated,
        Self::ReleaseRequestRequestAccepted,
        Self::ReviewOpened,
        Self::ReviewAccepted,
        Self::ReviewDeclined,
        Self::IssueCreated,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::ReleaseRequestCreated => "release_request_created",
            Self::ReleaseRequestRequestCreated => "release_request_request_created",
            Self::ReleaseRequestRequestAccepted => "release_request_request_accepted",
            Self::ReviewOpened => "review_opened",
            Self::ReviewAccepted => "review_accepted",
            Self::ReviewDeclined => "review_declined",
            Self::IssueCreated => "issue_created",
        }
    }

    /// Tie-break rank for entries sharing a timestamp. Creations sort
    /// before transitions.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::ProjectCreated => 0,
            Self::ReleaseRequestCreated => 1,
            Self::ReleaseRequestRequestCreated => 2,
            Self::IssueCreated => 3,
            Self::ReviewOpened => 4,
            Self::ReleaseRequestRequestAccepted => 5,
            Self::ReviewAccepted => 6,
            Self::ReviewDeclined => 7,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue an `issue_created` entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IssueRef {
    pub tracker: String,
    pub name: String,
}

/// One event in a project's maintenance timeline.
///
/// Values are copied out of the source records at normalization time and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    kind: EntryKind,
    when: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    who: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue: Option<IssueRef>,
}

impl TimelineEntry {
    pub(crate) const fn new(
        kind: EntryKind,
        when: DateTime<Utc>,
        who: Option<String>,
        issue: Option<IssueRef>,
    ) -> Self {
        Self {
            kind,
            when,
            who,
            issue,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    #[must_use]
    pub const fn when(&self) -> DateTime<Utc> {
        self.when
    }

    /// User login or group title, when the event has an actor.
    #[must_use]
    pub fn who(&self) -> Option<&str> {
        self.who.as_deref()
    }

    #[must_use]
    pub const fn issue(&self) -> Option<&IssueRef> {
        self.issue.as_ref()
    }
}

/// A project's maintenance timeline, oldest entry first.
///
/// Fully materialized: iterating it any number of times yields the same
/// entries in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Wrap entries that are already in timeline order.
    pub(crate) const fn from_sorted(entries: Vec<TimelineEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Entry at `index`, counting from the oldest.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    /// Entry at `index`, counting from the newest (0 is the newest entry).
    #[must_use]
    pub fn nth_from_end(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.iter().rev().nth(index)
    }

    /// Oldest entry.
    #[must_use]
    pub fn first(&self) -> Option<&TimelineEntry> {
        self.entries.first()
    }

    /// Newest entry.
    #[must_use]
    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    /// Kinds in timeline order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EntryKind> {
        self.entries.iter().map(TimelineEntry::kind).collect()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Timeline {
    type Item = TimelineEntry;
    type IntoIter = std::vec::IntoIter<TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
