//! Statistics database location.
//!
//! Determines where the statistics database lives based on an explicit
//! override, the environment, or the working directory.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the statistics database.
pub const DB_ENV_VAR: &str = "MAINT_STATS_DB";

/// Database location relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".maint/stats.db";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    pub db_path: PathBuf,
}

impl StatsConfig {
    /// Resolve the configuration.
    ///
    /// Resolution order:
    /// 1. Explicit override (`--db`)
    /// 2. `MAINT_STATS_DB` environment variable
    /// 3. `.maint/stats.db` under `cwd`
    #[must_use]
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Self {
        let from_env = env::var(DB_ENV_VAR).ok();
        Self::resolve_with(explicit, from_env.as_deref(), cwd)
    }

    fn resolve_with(explicit: Option<&Path>, from_env: Option<&str>, cwd: &Path) -> Self {
        let db_path = explicit.map_or_else(
            || {
                from_env
                    .filter(|s| !s.is_empty())
                    .map_or_else(|| cwd.join(DEFAULT_DB_PATH), |p| cwd.join(p))
            },
            |p| cwd.join(p),
        );
        Self { db_path }
    }
}
