//! Typed error types for the maint-core service layer.

use thiserror::Error;

/// Result type alias for core service operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while computing maintenance statistics.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The statistics database does not exist yet.
    #[error("No statistics database at {path}. Run 'maint-stats init' first.")]
    NotInitialized { path: String },

    /// No project with the given name exists.
    #[error("Project not found: {project}")]
    ProjectNotFound { project: String },

    /// An adapter could not read its records; the timeline is abandoned.
    #[error("Data source '{adapter}' unavailable")]
    DataSourceUnavailable {
        adapter: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A fact reached the normalizer without an entry mapping.
    #[error("No timeline entry mapping for fact '{kind}'")]
    UnmappedFact { kind: &'static str },

    /// A delegated review chain cannot be collapsed unambiguously.
    #[error("Ambiguous review chain at review {review_id}: {reason}")]
    AmbiguousChain { review_id: i64, reason: String },

    /// An internal storage or database error.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_message() {
        let err = CoreError::ProjectNotFound {
            project: "home:alice".to_string(),
        };
        assert_eq!(err.to_string(), "Project not found: home:alice");
    }

    #[test]
    fn test_data_source_keeps_cause() {
        let err = CoreError::DataSourceUnavailable {
            adapter: "reviews",
            source: anyhow::anyhow!("disk I/O error"),
        };
        assert_eq!(err.to_string(), "Data source 'reviews' unavailable");
        assert_eq!(err.source().unwrap().to_string(), "disk I/O error");
    }

    #[test]
    fn test_internal_is_transparent() {
        let err: CoreError = anyhow::anyhow!("locked").into();
        assert_eq!(err.to_string(), "locked");
    }
}
