//! Read queries over the record store.
//!
//! Implements [`RecordSource`] for [`StatsDb`]. Rows that fail to parse
//! (bad timestamps, unknown vocabulary) surface as errors rather than being
//! skipped.

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{placeholders, ts_column, vocab_column, StatsDb};
use crate::records::{Issue, Project, Request, RequestHistory, Review, ReviewHistory};
use crate::source::RecordSource;

impl RecordSource for StatsDb {
    fn project_by_name(&self, name: &str) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM projects WHERE name = ?",
                params![name],
                project_from_row,
            )
            .optional()
            .with_context(|| format!("Failed to query project '{name}'"))
    }

    fn requests_for_project(&self, project_id: i64) -> Result<Vec<Request>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, request_type, source_project_id, target_project_id,
                        creator, linked_request_id, created_at
                 FROM requests
                 WHERE source_project_id = ?1 OR target_project_id = ?1
                 ORDER BY id",
            )
            .context("Failed to prepare requests query")?;

        let rows = stmt
            .query_map(params![project_id], request_from_row)
            .context("Failed to execute requests query")?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.context("Failed to read request row")?);
        }
        Ok(results)
    }

    fn request_history(&self, request_ids: &[i64]) -> Result<Vec<RequestHistory>> {
        self.select_in(
            "SELECT id, request_id, kind, actor, created_at FROM request_history
             WHERE request_id IN ({ids})",
            request_ids,
            request_history_from_row,
            "request history",
        )
    }

    fn reviews_for_requests(&self, request_ids: &[i64]) -> Result<Vec<Review>> {
        self.select_in(
            "SELECT id, request_id, by_user, by_group, state, assigned_from, created_at
             FROM reviews WHERE request_id IN ({ids})",
            request_ids,
            review_from_row,
            "review",
        )
    }

    fn review_history(&self, review_ids: &[i64]) -> Result<Vec<ReviewHistory>> {
        self.select_in(
            "SELECT id, review_id, kind, actor, created_at FROM review_history
             WHERE review_id IN ({ids})",
            review_ids,
            review_history_from_row,
            "review history",
        )
    }

    fn issues_for_requests(&self, request_ids: &[i64]) -> Result<Vec<Issue>> {
        self.select_in(
            "SELECT id, request_id, tracker, name, created_at FROM issues
             WHERE request_id IN ({ids})",
            request_ids,
            issue_from_row,
            "issue",
        )
    }
}

/// Ids bound per `IN (...)` query, well below SQLite's bound-parameter limit.
const MAX_IN_PARAMS: usize = 500;

impl StatsDb {
    /// Run a query with an `IN ({ids})` clause bound to `ids`.
    ///
    /// `sql` must select the row id as its first column. Ids are bound in
    /// chunks of [`MAX_IN_PARAMS`]; rows from all chunks are returned ordered
    /// by row id, each row once.
    fn select_in<T>(
        &self,
        sql: &str,
        ids: &[i64],
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
        what: &str,
    ) -> Result<Vec<T>> {
        let mut keyed: Vec<(i64, T)> = Vec::new();

        for chunk in ids.chunks(MAX_IN_PARAMS) {
            let sql = sql.replace("{ids}", &placeholders(chunk.len()));

            let mut stmt = self
                .conn
                .prepare_cached(&sql)
                .with_context(|| format!("Failed to prepare {what} query"))?;

            let rows = stmt
                .query_map(params_from_iter(chunk), |row| Ok((row.get::<_, i64>(0)?, map(row)?)))
                .with_context(|| format!("Failed to execute {what} query"))?;

            for row in rows {
                keyed.push(row.with_context(|| format!("Failed to read {what} row"))?);
            }
        }

        keyed.sort_by_key(|(id, _)| *id);
        keyed.dedup_by_key(|(id, _)| *id);
        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: ts_column(row, 2)?,
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<Request> {
    Ok(Request {
        id: row.get(0)?,
        request_type: vocab_column(row, 1)?,
        source_project_id: row.get(2)?,
        target_project_id: row.get(3)?,
        creator: row.get(4)?,
        linked_request_id: row.get(5)?,
        created_at: ts_column(row, 6)?,
    })
}

fn request_history_from_row(row: &Row<'_>) -> rusqlite::Result<RequestHistory> {
    Ok(RequestHistory {
        request_id: row.get(1)?,
        kind: vocab_column(row, 2)?,
        actor: row.get(3)?,
        created_at: ts_column(row, 4)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        request_id: row.get(1)?,
        by_user: row.get(2)?,
        by_group: row.get(3)?,
        state: vocab_column(row, 4)?,
        assigned_from: row.get(5)?,
        created_at: ts_column(row, 6)?,
    })
}

fn review_history_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewHistory> {
    Ok(ReviewHistory {
        review_id: row.get(1)?,
        kind: vocab_column(row, 2)?,
        actor: row.get(3)?,
        created_at: ts_column(row, 4)?,
    })
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        request_id: row.get(1)?,
        tracker: row.get(2)?,
        name: row.get(3)?,
        created_at: ts_column(row, 4)?,
    })
}

// ============================================================================
// Tests
// ============================================================================
