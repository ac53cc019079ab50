//! Raw event facts produced by the source adapters.

use chrono::{DateTime, Utc};

use super::entry::IssueRef;

/// What happened, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    ProjectCreated,
    RequestCreated,
    LinkedRequestCreated,
    LinkedRequestAccepted,
    ReviewOpened,
    /// A review was delegated to another reviewer
    ReviewAssigned,
    ReviewAccepted,
    ReviewDeclined,
    IssueCreated,
}

impl FactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::RequestCreated => "request_created",
            Self::LinkedRequestCreated => "linked_request_created",
            Self::LinkedRequestAccepted => "linked_request_accepted",
            Self::ReviewOpened => "review_opened",
            Self::ReviewAssigned => "review_assigned",
            Self::ReviewAccepted => "review_accepted",
            Self::ReviewDeclined => "review_declined",
            Self::IssueCreated => "issue_created",
        }
    }

    /// Facts the review chain resolver consumes.
    #[must_use]
    pub const fn is_review(self) -> bool {
        matches!(
            self,
            Self::ReviewOpened | Self::ReviewAssigned | Self::ReviewAccepted | Self::ReviewDeclined
        )
    }
}

/// Record a fact was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactSource {
    Project(i64),
    Request(i64),
    Review {
        review_id: i64,
        /// Review this one was delegated from
        assigned_from: Option<i64>,
    },
    Issue(i64),
}

impl FactSource {
    /// Review id, for facts read from a review or its history.
    #[must_use]
    pub const fn review_id(self) -> Option<i64> {
        match self {
            Self::Review { review_id, .. } => Some(review_id),
            _ => None,
        }
    }

    /// Id of the record the fact was read from.
    #[must_use]
    pub const fn record_id(self) -> i64 {
        match self {
            Self::Project(id) | Self::Request(id) | Self::Issue(id) => id,
            Self::Review { review_id, .. } => review_id,
        }
    }
}

/// One event read from a source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFact {
    pub kind: FactKind,
    pub source: FactSource,
    pub when: DateTime<Utc>,
    pub actor: Option<String>,
    pub issue: Option<IssueRef>,
}

impl RawFact {
    pub const fn new(
        kind: FactKind,
        source: FactSource,
        when: DateTime<Utc>,
        actor: Option<String>,
    ) -> Self {
        Self {
            kind,
            source,
            when,
            actor,
            issue: None,
        }
    }

    pub fn with_issue(mut self, issue: IssueRef) -> Self {
        self.issue = Some(issue);
        self
    }
}
