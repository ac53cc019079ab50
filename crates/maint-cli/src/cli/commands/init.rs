//! Implementation of `maint-stats init` command.

use anyhow::Result;

use maint_core::config::StatsConfig;
use maint_core::store::StatsDb;

/// Run the init command.
///
/// Creates the statistics database and its schema.
#[tracing::instrument(skip(config))]
pub fn run_init(config: &StatsConfig) -> Result<()> {
    let path = &config.db_path;

    if path.exists() {
        println!("Already initialized: {}", path.display());
        return Ok(());
    }

    let db = StatsDb::open(path)?;
    db.init_schema()?;

    println!("Initialized statistics database at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_database() {
        let dir = tempdir().unwrap();
        let config = StatsConfig {
            db_path: dir.path().join(".maint/stats.db"),
        };

        run_init(&config).unwrap();
        assert!(config.db_path.exists());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempdir().unwrap();
        let config = StatsConfig {
            db_path: dir.path().join("stats.db"),
        };

        run_init(&config).unwrap();
        run_init(&config).unwrap();
        assert!(config.db_path.exists());
    }
}
