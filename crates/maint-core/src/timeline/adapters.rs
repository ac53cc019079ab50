//! Event source adapters.
//!
//! Each adapter pulls one kind of record for a project and maps it to raw
//! facts. Adapters only read, share no state and may run in any order; the
//! facade runs them in [`ADAPTERS`] order so emission order is stable.

use anyhow::Result;

use super::entry::IssueRef;
use super::fact::{FactKind, FactSource, RawFact};
use crate::records::{Project, Request, RequestHistoryKind, ReviewHistoryKind};
use crate::source::RecordSource;

/// The project a timeline is computed for, plus its requests.
///
/// Resolved once by the facade and shared read-only by every adapter.
#[derive(Debug, Clone)]
pub struct ProjectScope {
    pub project: Project,
    pub requests: Vec<Request>,
}

impl ProjectScope {
    pub fn load(source: &dyn RecordSource, project: Project) -> Result<Self> {
        let requests = source.requests_for_project(project.id)?;
        Ok(Self { project, requests })
    }

    #[must_use]
    pub fn request_ids(&self) -> Vec<i64> {
        self.requests.iter().map(|r| r.id).collect()
    }
}

/// Maps one kind of source record to raw facts.
pub trait FactAdapter {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn collect(&self, source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>>;
}

/// All adapters, in emission order.
pub const ADAPTERS: &[&(dyn FactAdapter + Sync)] = &[
    &ProjectAdapter,
    &ReleaseRequestAdapter,
    &RequestSubEventAdapter,
    &ReviewAdapter,
    &ReviewHistoryAdapter,
    &IssueAdapter,
];

// ============================================================================
// Projects and requests
// ============================================================================

pub struct ProjectAdapter;

impl FactAdapter for ProjectAdapter {
    fn name(&self) -> &'static str {
        "projects"
    }

    fn collect(&self, _source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>> {
        Ok(vec![RawFact::new(
            FactKind::ProjectCreated,
            FactSource::Project(scope.project.id),
            scope.project.created_at,
            None,
        )])
    }
}

pub struct ReleaseRequestAdapter;

impl FactAdapter for ReleaseRequestAdapter {
    fn name(&self) -> &'static str {
        "release requests"
    }

    fn collect(&self, _source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>> {
        Ok(scope
            .requests
            .iter()
            .map(|request| {
                RawFact::new(
                    FactKind::RequestCreated,
                    FactSource::Request(request.id),
                    request.created_at,
                    Some(request.creator.clone()),
                )
            })
            .collect())
    }
}

/// Creation and acceptance of the request chain behind a maintenance
/// release: the release request itself and the request it links to.
pub struct RequestSubEventAdapter;

impl FactAdapter for RequestSubEventAdapter {
    fn name(&self) -> &'static str {
        "request sub-events"
    }

    fn collect(&self, source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>> {
        let mut chain_ids = Vec::new();
        for request in scope
            .requests
            .iter()
            .filter(|r| r.request_type.is_maintenance_release())
        {
            chain_ids.push(request.id);
            if let Some(linked) = request.linked_request_id {
                chain_ids.push(linked);
            }
        }
        chain_ids.sort_unstable();
        chain_ids.dedup();

        let facts = source
            .request_history(&chain_ids)?
            .into_iter()
            .filter_map(|record| {
                let kind = match record.kind {
                    RequestHistoryKind::Created => FactKind::LinkedRequestCreated,
                    RequestHistoryKind::Accepted => FactKind::LinkedRequestAccepted,
                    RequestHistoryKind::Declined
                    | RequestHistoryKind::Revoked
                    | RequestHistoryKind::Superseded => return None,
                };
                Some(RawFact::new(
                    kind,
                    FactSource::Request(record.request_id),
                    record.created_at,
                    record.actor,
                ))
            })
            .collect();
        Ok(facts)
    }
}

// ============================================================================
// Reviews
// ============================================================================

pub struct ReviewAdapter;

impl FactAdapter for ReviewAdapter {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn collect(&self, source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>> {
        Ok(source
            .reviews_for_requests(&scope.request_ids())?
            .into_iter()
            .map(|review| {
                RawFact::new(
                    FactKind::ReviewOpened,
                    FactSource::Review {
                        review_id: review.id,
                        assigned_from: review.assigned_from,
                    },
                    review.created_at,
                    review.reviewer().map(|r| r.name().to_string()),
                )
            })
            .collect())
    }
}

pub struct ReviewHistoryAdapter;

impl FactAdapter for ReviewHistoryAdapter {
    fn name(&self) -> &'static str {
        "review history"
    }

    fn collect(&self, source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>> {
        let reviews = source.reviews_for_requests(&scope.request_ids())?;
        let review_ids: Vec<i64> = reviews.iter().map(|r| r.id).collect();

        let facts = source
            .review_history(&review_ids)?
            .into_iter()
            .filter_map(|record| {
                let kind = match record.kind {
                    ReviewHistoryKind::Assigned => FactKind::ReviewAssigned,
                    ReviewHistoryKind::Accepted => FactKind::ReviewAccepted,
                    ReviewHistoryKind::Declined => FactKind::ReviewDeclined,
                    ReviewHistoryKind::Reopened => return None,
                };
                let assigned_from = reviews
                    .iter()
                    .find(|r| r.id == record.review_id)
                    .and_then(|r| r.assigned_from);
                Some(RawFact::new(
                    kind,
                    FactSource::Review {
                        review_id: record.review_id,
                        assigned_from,
                    },
                    record.created_at,
                    record.actor,
                ))
            })
            .collect();
        Ok(facts)
    }
}

// ============================================================================
// Issues
// ============================================================================

pub struct IssueAdapter;

impl FactAdapter for IssueAdapter {
    fn name(&self) -> &'static str {
        "issues"
    }

    fn collect(&self, source: &dyn RecordSource, scope: &ProjectScope) -> Result<Vec<RawFact>> {
        Ok(source
            .issues_for_requests(&scope.request_ids())?
            .into_iter()
            .map(|issue| {
                RawFact::new(
                    FactKind::IssueCreated,
                    FactSource::Issue(issue.id),
                    issue.created_at,
                    None,
                )
                .with_issue(IssueRef {
                    tracker: issue.tracker,
                    name: issue.name,
                })
            })
            .collect())
    }
}
