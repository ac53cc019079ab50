//! Read-only access to source records.

use anyhow::Result;

use crate::records::{Issue, Project, Request, RequestHistory, Review, ReviewHistory};

/// Read interface the timeline adapters pull records through.
///
/// Every method returns records in a stable order (record id, or insertion
/// order for history records) so repeated reads over unchanged data yield
/// identical results. Empty id slices yield empty results.
pub trait RecordSource {
    /// Look up a project by its unique name.
    fn project_by_name(&self, name: &str) -> Result<Option<Project>>;

    /// Requests whose source or target is the given project.
    fn requests_for_project(&self, project_id: i64) -> Result<Vec<Request>>;

    /// History records for the given requests.
    fn request_history(&self, request_ids: &[i64]) -> Result<Vec<RequestHistory>>;

    /// Reviews on the given requests.
    fn reviews_for_requests(&self, request_ids: &[i64]) -> Result<Vec<Review>>;

    /// History records for the given reviews.
    fn review_history(&self, review_ids: &[i64]) -> Result<Vec<ReviewHistory>>;

    /// Issues linked to the given requests.
    fn issues_for_requests(&self, request_ids: &[i64]) -> Result<Vec<Issue>>;
}
