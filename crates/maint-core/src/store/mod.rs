//! SQLite record store.
//!
//! Holds the projects, requests, reviews, history records and issues the
//! maintenance timeline is computed from. The timeline engine only reads
//! through [`RecordSource`](crate::source::RecordSource); the write path in
//! `write.rs` exists for initialization, imports and test fixtures.

#![allow(clippy::missing_errors_doc)]

mod query;
mod write;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};

use crate::records::ParseRecordError;

/// Database holding the source records.
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Open or create a record store at the given path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directories: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        Ok(Self { conn })
    }

    /// Create an in-memory record store (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        Ok(Self { conn })
    }

    /// Initialize the database schema.
    ///
    /// Creates all tables and indexes if they don't exist.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ============================================================================
// Column helpers
// ============================================================================

/// Read an RFC 3339 timestamp column.
fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a vocabulary column into its closed enum.
fn vocab_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseRecordError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `?, ?, ?` for an `IN (...)` clause with `n` parameters.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

// ============================================================================
// Schema SQL
// ============================================================================

const SCHEMA_SQL: &str = r"
-- PROJECTS
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- REQUESTS
CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY,
    request_type TEXT NOT NULL
        CHECK (request_type IN ('submit', 'maintenance_incident', 'maintenance_release')),
    source_project_id INTEGER REFERENCES projects(id),
    target_project_id INTEGER REFERENCES projects(id),
    creator TEXT NOT NULL,
    linked_request_id INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_requests_source ON requests(source_project_id);
CREATE INDEX IF NOT EXISTS idx_requests_target ON requests(target_project_id);

-- REQUEST HISTORY
CREATE TABLE IF NOT EXISTS request_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL REFERENCES requests(id),
    kind TEXT NOT NULL
        CHECK (kind IN ('created', 'accepted', 'declined', 'revoked', 'superseded')),
    actor TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_request_history_request ON request_history(request_id);

-- REVIEWS
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY,
    request_id INTEGER NOT NULL REFERENCES requests(id),
    by_user TEXT,
    by_group TEXT,
    state TEXT NOT NULL DEFAULT 'new'
        CHECK (state IN ('new', 'accepted', 'declined', 'superseded', 'obsoleted')),
    assigned_from INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_request ON reviews(request_id);

-- REVIEW HISTORY
CREATE TABLE IF NOT EXISTS review_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    review_id INTEGER NOT NULL REFERENCES reviews(id),
    kind TEXT NOT NULL
        CHECK (kind IN ('assigned', 'accepted', 'declined', 'reopened')),
    actor TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_review_history_review ON review_history(review_id);

-- ISSUES
CREATE TABLE IF NOT EXISTS issues (
    id INTEGER PRIMARY KEY,
    request_id INTEGER NOT NULL REFERENCES requests(id),
    tracker TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_issues_request ON issues(request_id);
";
