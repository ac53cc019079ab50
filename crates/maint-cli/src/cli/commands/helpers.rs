//! Shared helpers for CLI commands.

use anyhow::Result;

use maint_core::config::StatsConfig;
use maint_core::core::{StatsContext, StatsServices};

/// Open the configured statistics database.
///
/// Fails with instructions to run `init` when the database does not exist.
pub fn open_services(config: &StatsConfig) -> Result<StatsServices> {
    let ctx = StatsContext::new(&config.db_path)?;
    Ok(ctx.services()?)
}
