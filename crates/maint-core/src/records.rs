//! Source records the maintenance timeline is computed from.
//!
//! These mirror the rows of the record store one-to-one. Vocabulary columns
//! (request type, review state, history kinds) are closed enums that
//! serialize as lowercase snake_case strings, both in JSON bundles and in
//! the database.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A vocabulary column held a value outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} '{value}'")]
pub struct ParseRecordError {
    pub field: &'static str,
    pub value: String,
}

/// Generates `as_str`, `Display` and `FromStr` for a string-backed vocabulary.
macro_rules! vocabulary {
    ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseRecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseRecordError {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Unique project name (e.g., "openSUSE:Maintenance:1234")
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Requests
// ============================================================================

/// Kind of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Plain submission into a target project
    Submit,
    /// Opens a maintenance incident
    MaintenanceIncident,
    /// Releases a maintenance incident into its update project
    MaintenanceRelease,
}

vocabulary!(RequestType, "request type", {
    Submit => "submit",
    MaintenanceIncident => "maintenance_incident",
    MaintenanceRelease => "maintenance_release",
});

impl RequestType {
    /// Whether requests of this type carry linked-request sub-events.
    #[must_use]
    pub const fn is_maintenance_release(self) -> bool {
        matches!(self, Self::MaintenanceRelease)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: i64,
    pub request_type: RequestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_project_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<i64>,
    /// Login of the user who created the request
    pub creator: String,
    /// Secondary request this one forwards to or was forwarded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_request_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Audit record kinds for request transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestHistoryKind {
    Created,
    Accepted,
    Declined,
    Revoked,
    Superseded,
}

vocabulary!(RequestHistoryKind, "request history kind", {
    Created => "created",
    Accepted => "accepted",
    Declined => "declined",
    Revoked => "revoked",
    Superseded => "superseded",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHistory {
    pub request_id: i64,
    pub kind: RequestHistoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    New,
    Accepted,
    Declined,
    Superseded,
    Obsoleted,
}

vocabulary!(ReviewState, "review state", {
    New => "new",
    Accepted => "accepted",
    Declined => "declined",
    Superseded => "superseded",
    Obsoleted => "obsoleted",
});

/// Who a review is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reviewer {
    /// A user, by login
    User(String),
    /// A group, by title
    Group(String),
}

impl Reviewer {
    /// Login or group title.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::User(name) | Self::Group(name) => name,
        }
    }
}

impl fmt::Display for Reviewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub request_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_group: Option<String>,
    pub state: ReviewState,
    /// Review this one was delegated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_from: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// The reviewer: the user if one is set, otherwise the group.
    #[must_use]
    pub fn reviewer(&self) -> Option<Reviewer> {
        self.by_user
            .clone()
            .map(Reviewer::User)
            .or_else(|| self.by_group.clone().map(Reviewer::Group))
    }
}

/// Audit record kinds for review transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewHistoryKind {
    /// The review was delegated to another reviewer
    Assigned,
    Accepted,
    Declined,
    Reopened,
}

vocabulary!(ReviewHistoryKind, "review history kind", {
    Assigned => "assigned",
    Accepted => "accepted",
    Declined => "declined",
    Reopened => "reopened",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewHistory {
    pub review_id: i64,
    pub kind: ReviewHistoryKind,
    /// User who performed the transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Issues
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub request_id: i64,
    /// Issue tracker short name (e.g., "bnc", "CVE")
    pub tracker: String,
    /// Issue name within the tracker
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Bundles
// ============================================================================

/// A set of records loaded together, e.g. from a JSON fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordBundle {
    pub projects: Vec<Project>,
    pub requests: Vec<Request>,
    pub request_history: Vec<RequestHistory>,
    pub reviews: Vec<Review>,
    pub review_history: Vec<ReviewHistory>,
    pub issues: Vec<Issue>,
}

impl RecordBundle {
    /// Parse a bundle from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total number of records across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
            + self.requests.len()
            + self.request_history.len()
            + self.reviews.len()
            + self.review_history.len()
            + self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
