//! Implementation of `maint-stats timeline` command.

use anyhow::{anyhow, Result};

use crate::cli::commands::helpers::open_services;
use crate::output::Formatter;
use maint_core::config::StatsConfig;
use maint_core::core::CoreError;

/// Print the maintenance timeline of a project, oldest entry first.
#[tracing::instrument(skip(config, formatter))]
pub fn run_timeline(config: &StatsConfig, project: &str, formatter: &Formatter) -> Result<()> {
    let services = open_services(config)?;
    let timeline = services
        .timeline()
        .compute(project)
        .map_err(|err| describe_failure(project, err))?;

    formatter.print_list(timeline.entries(), "No maintenance events", "timeline")
}

/// Turn a failed computation into the message shown to the user.
///
/// A missing project is reported as such; anything else is logged in full
/// and reported generically.
fn describe_failure(project: &str, err: CoreError) -> anyhow::Error {
    match err {
        CoreError::ProjectNotFound { .. } | CoreError::NotInitialized { .. } => anyhow!(err),
        other => {
            let cause = anyhow::Error::from(other);
            tracing::error!(project, error = ?cause, "timeline computation failed");
            anyhow!("Failed to compute maintenance statistics for {project}")
        }
    }
}
