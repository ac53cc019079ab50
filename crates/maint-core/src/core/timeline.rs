//! Timeline service - compute maintenance timelines from the statistics db.

use crate::store::StatsDb;
use crate::timeline::{compute_timeline, Timeline};

use super::CoreResult;

/// Service for timeline operations.
pub struct TimelineService<'a> {
    db: &'a StatsDb,
}

impl<'a> TimelineService<'a> {
    pub(crate) const fn new(db: &'a StatsDb) -> Self {
        Self { db }
    }

    /// Compute the maintenance timeline of a project, oldest entry first.
    #[tracing::instrument(skip(self))]
    pub fn compute(&self, project: &str) -> CoreResult<Timeline> {
        compute_timeline(self.db, project)
    }
}
