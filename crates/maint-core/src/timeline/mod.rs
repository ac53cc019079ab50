//! Maintenance timeline computation.
//!
//! A timeline is built in four stages: adapters pull raw facts from a
//! [`RecordSource`], the chain resolver collapses delegated reviews, the
//! normalizer turns every fact into a [`TimelineEntry`], and the merger
//! orders the result.

mod adapters;
mod chain;
pub mod entry;
mod fact;
mod merge;
mod normalize;

pub use entry::{EntryKind, IssueRef, Timeline, TimelineEntry};

use adapters::{ProjectScope, ADAPTERS};
use chain::resolve_review_chains;
use fact::RawFact;
use merge::merge;
use normalize::normalize_all;

use crate::core::{CoreError, CoreResult};
use crate::source::RecordSource;

/// Compute the maintenance timeline for the project named `project`.
///
/// Fails as a whole if any record source cannot be read; partial timelines
/// are never returned.
#[tracing::instrument(skip(source))]
pub fn compute_timeline(source: &dyn RecordSource, project: &str) -> CoreResult<Timeline> {
    let found = source
        .project_by_name(project)
        .map_err(|source| CoreError::DataSourceUnavailable {
            adapter: "projects",
            source,
        })?
        .ok_or_else(|| CoreError::ProjectNotFound {
            project: project.to_string(),
        })?;

    let scope =
        ProjectScope::load(source, found).map_err(|source| CoreError::DataSourceUnavailable {
            adapter: "release requests",
            source,
        })?;

    let facts = collect_facts(source, &scope)?;
    let entries = normalize_all(facts)?;
    let timeline = merge(entries);
    tracing::debug!(entries = timeline.len(), "timeline computed");
    Ok(timeline)
}

/// Run every adapter and return the facts in emission order, with review
/// facts replaced by their resolved chains where the review adapters emit.
fn collect_facts(source: &dyn RecordSource, scope: &ProjectScope) -> CoreResult<Vec<RawFact>> {
    let mut facts = Vec::new();
    let mut review_facts = Vec::new();
    let mut review_slot = None;

    for adapter in ADAPTERS {
        let collected = adapter.collect(source, scope).map_err(|source| {
            CoreError::DataSourceUnavailable {
                adapter: adapter.name(),
                source,
            }
        })?;
        tracing::debug!(adapter = adapter.name(), facts = collected.len(), "collected");

        for fact in collected {
            if fact.kind.is_review() {
                review_slot.get_or_insert(facts.len());
                review_facts.push(fact);
            } else {
                facts.push(fact);
            }
        }
    }

    let resolved = resolve_review_chains(&review_facts)?;
    let tail = facts.split_off(review_slot.unwrap_or(facts.len()));
    facts.extend(resolved);
    facts.extend(tail);
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        Issue, Project, RecordBundle, Request, RequestHistory, RequestHistoryKind, RequestType,
        Review, ReviewHistory, ReviewHistoryKind, ReviewState,
    };
    use crate::store::StatsDb;
    use anyhow::{bail, Result};
    use chrono::{DateTime, Duration, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn seeded() -> StatsDb {
        let db = StatsDb::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.insert_project(&Project {
            id: 1,
            name: "openSUSE:Maintenance".to_string(),
            created_at: t0(),
        })
        .unwrap();
        db
    }

    #[test]
    fn test_project_without_requests() {
        let db = seeded();

        let timeline = compute_timeline(&db, "openSUSE:Maintenance").unwrap();
        assert_eq!(timeline.kinds(), vec![EntryKind::ProjectCreated]);
        assert_eq!(timeline.first().unwrap().when(), t0());
        assert_eq!(timeline.first().unwrap().who(), None);
    }

    #[test]
    fn test_unknown_project() {
        let db = seeded();

        let err = compute_timeline(&db, "home:nobody").unwrap_err();
        assert!(matches!(err, CoreError::ProjectNotFound { ref project } if project == "home:nobody"));
    }

    #[test]
    fn test_delegated_review_collapses() {
        let db = seeded();
        db.insert_request(&Request {
            id: 10,
            request_type: RequestType::MaintenanceIncident,
            source_project_id: Some(1),
            target_project_id: None,
            creator: "alice".to_string(),
            linked_request_id: None,
            created_at: t0() + Duration::hours(1),
        })
        .unwrap();
        db.insert_review(&Review {
            id: 100,
            request_id: 10,
            by_user: None,
            by_group: Some("qa-team".to_string()),
            state: ReviewState::New,
            assigned_from: None,
            created_at: t0() + Duration::hours(2),
        })
        .unwrap();
        let assigned = db
            .assign_review(
                100,
                &crate::records::Reviewer::User("bob".to_string()),
                "carol",
                t0() + Duration::hours(3),
            )
            .unwrap();
        db.insert_review_history(&ReviewHistory {
            review_id: assigned,
            kind: ReviewHistoryKind::Accepted,
            actor: Some("bob".to_string()),
            created_at: t0() + Duration::hours(4),
        })
        .unwrap();

        let timeline = compute_timeline(&db, "openSUSE:Maintenance").unwrap();
        assert_eq!(
            timeline.kinds(),
            vec![
                EntryKind::ProjectCreated,
                EntryKind::ReleaseRequestCreated,
                EntryKind::ReviewOpened,
                EntryKind::ReviewAccepted,
            ]
        );
        let opened = timeline.get(2).unwrap();
        assert_eq!(opened.who(), Some("qa-team"));
        assert_eq!(opened.when(), t0() + Duration::hours(2));
        let accepted = timeline.get(3).unwrap();
        assert_eq!(accepted.who(), Some("qa-team"));
        assert_eq!(accepted.when(), t0() + Duration::hours(4));
    }

    #[test]
    fn test_issue_and_history_entries() {
        let db = seeded();
        db.insert_request(&Request {
            id: 10,
            request_type: RequestType::MaintenanceRelease,
            source_project_id: None,
            target_project_id: Some(1),
            creator: "alice".to_string(),
            linked_request_id: None,
            created_at: t0() + Duration::hours(1),
        })
        .unwrap();
        db.insert_request_history(&RequestHistory {
            request_id: 10,
            kind: RequestHistoryKind::Accepted,
            actor: Some("maintenance-bot".to_string()),
            created_at: t0() + Duration::hours(5),
        })
        .unwrap();
        db.insert_issue(&Issue {
            id: 7,
            request_id: 10,
            tracker: "bnc".to_string(),
            name: "1234567".to_string(),
            created_at: t0() + Duration::hours(1),
        })
        .unwrap();

        let timeline = compute_timeline(&db, "openSUSE:Maintenance").unwrap();
        assert_eq!(
            timeline.kinds(),
            vec![
                EntryKind::ProjectCreated,
                EntryKind::ReleaseRequestCreated,
                EntryKind::IssueCreated,
                EntryKind::ReleaseRequestRequestAccepted,
            ]
        );
        let issue = timeline.get(2).unwrap().issue().unwrap();
        assert_eq!(issue.tracker, "bnc");
        assert_eq!(timeline.last().unwrap().who(), Some("maintenance-bot"));
    }

    fn review(id: i64, request_id: i64, assigned_from: Option<i64>, hours: i64) -> Review {
        Review {
            id,
            request_id,
            by_user: None,
            by_group: Some("qa-team".to_string()),
            state: ReviewState::New,
            assigned_from,
            created_at: t0() + Duration::hours(hours),
        }
    }

    fn incident(db: &StatsDb) {
        db.insert_request(&Request {
            id: 10,
            request_type: RequestType::MaintenanceIncident,
            source_project_id: Some(1),
            target_project_id: None,
            creator: "alice".to_string(),
            linked_request_id: None,
            created_at: t0() + Duration::hours(1),
        })
        .unwrap();
    }

    #[test]
    fn test_forked_delegation_fails_whole_computation() {
        let db = seeded();
        incident(&db);
        db.insert_review(&review(100, 10, None, 2)).unwrap();
        db.insert_review(&review(101, 10, Some(100), 3)).unwrap();
        db.insert_review(&review(102, 10, Some(100), 3)).unwrap();

        let err = compute_timeline(&db, "openSUSE:Maintenance").unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousChain { review_id: 100, .. }));
    }

    #[test]
    fn test_delegation_cycle_fails_whole_computation() {
        let db = seeded();
        incident(&db);
        db.insert_review(&review(100, 10, Some(101), 2)).unwrap();
        db.insert_review(&review(101, 10, Some(100), 3)).unwrap();

        let err = compute_timeline(&db, "openSUSE:Maintenance").unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousChain { .. }));
    }

    #[test]
    fn test_resolved_reviews_emitted_before_issues() {
        let db = seeded();
        incident(&db);
        db.insert_review(&review(100, 10, None, 2)).unwrap();
        db.insert_issue(&Issue {
            id: 7,
            request_id: 10,
            tracker: "CVE".to_string(),
            name: "CVE-2024-0001".to_string(),
            created_at: t0(),
        })
        .unwrap();

        let project = db.project_by_name("openSUSE:Maintenance").unwrap().unwrap();
        let scope = ProjectScope::load(&db, project).unwrap();
        let kinds: Vec<_> = collect_facts(&db, &scope)
            .unwrap()
            .into_iter()
            .map(|f| f.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                fact::FactKind::ProjectCreated,
                fact::FactKind::RequestCreated,
                fact::FactKind::ReviewOpened,
                fact::FactKind::IssueCreated,
            ]
        );
    }

    #[test]
    fn test_project_with_many_requests() {
        let db = seeded();
        let requests: Vec<Request> = (1..=40_000)
            .map(|id| Request {
                id,
                request_type: RequestType::Submit,
                source_project_id: None,
                target_project_id: Some(1),
                creator: "alice".to_string(),
                linked_request_id: None,
                created_at: t0() + Duration::seconds(id),
            })
            .collect();
        db.import_bundle(&RecordBundle {
            requests,
            ..RecordBundle::default()
        })
        .unwrap();
        db.insert_review(&review(100, 40_000, None, 24)).unwrap();

        let timeline = compute_timeline(&db, "openSUSE:Maintenance").unwrap();
        assert_eq!(timeline.len(), 40_002);
        assert_eq!(timeline.last().unwrap().kind(), EntryKind::ReviewOpened);
        assert_eq!(timeline.last().unwrap().who(), Some("qa-team"));
    }

    struct BrokenReviews<'a>(&'a StatsDb);

    impl RecordSource for BrokenReviews<'_> {
        fn project_by_name(&self, name: &str) -> Result<Option<Project>> {
            self.0.project_by_name(name)
        }
        fn requests_for_project(&self, project_id: i64) -> Result<Vec<Request>> {
            self.0.requests_for_project(project_id)
        }
        fn request_history(&self, request_ids: &[i64]) -> Result<Vec<RequestHistory>> {
            self.0.request_history(request_ids)
        }
        fn reviews_for_requests(&self, _request_ids: &[i64]) -> Result<Vec<Review>> {
            bail!("reviews table is locked")
        }
        fn review_history(&self, review_ids: &[i64]) -> Result<Vec<ReviewHistory>> {
            self.0.review_history(review_ids)
        }
        fn issues_for_requests(&self, request_ids: &[i64]) -> Result<Vec<Issue>> {
            self.0.issues_for_requests(request_ids)
        }
    }

    #[test]
    fn test_failing_source_fails_whole_computation() {
        let db = seeded();
        let broken = BrokenReviews(&db);

        let err = compute_timeline(&broken, "openSUSE:Maintenance").unwrap_err();
        match err {
            CoreError::DataSourceUnavailable { adapter, source } => {
                assert_eq!(adapter, "reviews");
                assert!(source.to_string().contains("locked"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
