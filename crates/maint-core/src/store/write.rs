//! Write path for the record store.
//!
//! Used by `maint-stats init`/`import` and by test fixtures. The timeline
//! engine never calls into this module.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::StatsDb;
use crate::records::{
    Issue, Project, RecordBundle, Request, RequestHistory, Review, ReviewHistory,
    ReviewHistoryKind, ReviewState, Reviewer,
};

impl StatsDb {
    pub fn insert_project(&self, project: &Project) -> Result<()> {
        insert_project(&self.conn, project)
    }

    pub fn insert_request(&self, request: &Request) -> Result<()> {
        insert_request(&self.conn, request)
    }

    pub fn insert_request_history(&self, record: &RequestHistory) -> Result<()> {
        insert_request_history(&self.conn, record)
    }

    pub fn insert_review(&self, review: &Review) -> Result<()> {
        insert_review(&self.conn, review)
    }

    pub fn insert_review_history(&self, record: &ReviewHistory) -> Result<()> {
        insert_review_history(&self.conn, record)
    }

    pub fn insert_issue(&self, issue: &Issue) -> Result<()> {
        insert_issue(&self.conn, issue)
    }

    /// Delegate an open review to a new reviewer.
    ///
    /// Creates a new review on the same request whose `assigned_from` points
    /// at the original, marks the original accepted and records an `assigned`
    /// history entry on it performed by `acting_user`. Returns the new
    /// review's id.
    pub fn assign_review(
        &self,
        review_id: i64,
        reviewer: &Reviewer,
        acting_user: &str,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let found: Option<(i64, String)> = tx
            .query_row(
                "SELECT request_id, state FROM reviews WHERE id = ?",
                params![review_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to query review")?;

        let Some((request_id, state)) = found else {
            bail!("Review not found: {review_id}");
        };
        if state != ReviewState::New.as_str() {
            bail!("Review {review_id} has state '{state}', expected 'new'");
        }

        let (by_user, by_group) = match reviewer {
            Reviewer::User(login) => (Some(login.as_str()), None),
            Reviewer::Group(title) => (None, Some(title.as_str())),
        };

        tx.execute(
            "INSERT INTO reviews (request_id, by_user, by_group, state, assigned_from, created_at)
             VALUES (?, ?, ?, 'new', ?, ?)",
            params![request_id, by_user, by_group, review_id, at.to_rfc3339()],
        )
        .context("Failed to insert delegated review")?;
        let new_id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE reviews SET state = 'accepted' WHERE id = ?",
            params![review_id],
        )
        .context("Failed to update original review")?;

        insert_review_history(
            &tx,
            &ReviewHistory {
                review_id,
                kind: ReviewHistoryKind::Assigned,
                actor: Some(acting_user.to_string()),
                created_at: at,
            },
        )?;

        tx.commit().context("Failed to commit transaction")?;

        tracing::debug!(review_id, new_id, reviewer = %reviewer, acting_user, "review assigned");
        Ok(new_id)
    }

    /// Load every record in `bundle` inside a single transaction.
    ///
    /// Records are inserted parents first. Returns the number of records
    /// inserted.
    pub fn import_bundle(&self, bundle: &RecordBundle) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin import transaction")?;

        for project in &bundle.projects {
            insert_project(&tx, project)?;
        }
        for request in &bundle.requests {
            insert_request(&tx, request)?;
        }
        for record in &bundle.request_history {
            insert_request_history(&tx, record)?;
        }
        for review in &bundle.reviews {
            insert_review(&tx, review)?;
        }
        for record in &bundle.review_history {
            insert_review_history(&tx, record)?;
        }
        for issue in &bundle.issues {
            insert_issue(&tx, issue)?;
        }

        tx.commit().context("Failed to commit import")?;

        Ok(bundle.len())
    }
}

// ============================================================================
// Row writers
// ============================================================================

fn insert_project(conn: &Connection, project: &Project) -> Result<()> {
    conn.execute(
        "INSERT INTO projects (id, name, created_at) VALUES (?, ?, ?)",
        params![project.id, project.name, project.created_at.to_rfc3339()],
    )
    .with_context(|| format!("Failed to insert project '{}'", project.name))?;
    Ok(())
}

fn insert_request(conn: &Connection, request: &Request) -> Result<()> {
    conn.execute(
        "INSERT INTO requests (
            id, request_type, source_project_id, target_project_id,
            creator, linked_request_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            request.id,
            request.request_type.as_str(),
            request.source_project_id,
            request.target_project_id,
            request.creator,
            request.linked_request_id,
            request.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert request {}", request.id))?;
    Ok(())
}

fn insert_request_history(conn: &Connection, record: &RequestHistory) -> Result<()> {
    conn.execute(
        "INSERT INTO request_history (request_id, kind, actor, created_at)
         VALUES (?, ?, ?, ?)",
        params![
            record.request_id,
            record.kind.as_str(),
            record.actor,
            record.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert history for request {}", record.request_id))?;
    Ok(())
}

fn insert_review(conn: &Connection, review: &Review) -> Result<()> {
    conn.execute(
        "INSERT INTO reviews (
            id, request_id, by_user, by_group, state, assigned_from, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            review.id,
            review.request_id,
            review.by_user,
            review.by_group,
            review.state.as_str(),
            review.assigned_from,
            review.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert review {}", review.id))?;
    Ok(())
}

fn insert_review_history(conn: &Connection, record: &ReviewHistory) -> Result<()> {
    conn.execute(
        "INSERT INTO review_history (review_id, kind, actor, created_at)
         VALUES (?, ?, ?, ?)",
        params![
            record.review_id,
            record.kind.as_str(),
            record.actor,
            record.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert history for review {}", record.review_id))?;
    Ok(())
}

fn insert_issue(conn: &Connection, issue: &Issue) -> Result<()> {
    conn.execute(
        "INSERT INTO issues (id, request_id, tracker, name, created_at)
         VALUES (?, ?, ?, ?, ?)",
        params![
            issue.id,
            issue.request_id,
            issue.tracker,
            issue.name,
            issue.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| format!("Failed to insert issue {}#{}", issue.tracker, issue.name))?;
    Ok(())
}
