//! Service layer for maint-core.
//!
//! Wraps statistics database management behind a small typed API.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use maint_core::core::StatsContext;
//!
//! let ctx = StatsContext::new(Path::new("/srv/obs/.maint/stats.db")).unwrap();
//! let services = ctx.services().unwrap();
//! let timeline = services.timeline().compute("openSUSE:Maintenance").unwrap();
//! ```

pub mod errors;
pub mod timeline;

pub use errors::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

use crate::store::StatsDb;

/// Context for maint-core services.
#[derive(Debug, Clone)]
pub struct StatsContext {
    /// Path to the statistics database file.
    db_path: PathBuf,
}

impl StatsContext {
    /// Create a new context for an existing statistics database.
    ///
    /// Fails with [`CoreError::NotInitialized`] when the file is missing.
    pub fn new(db_path: &Path) -> CoreResult<Self> {
        if !db_path.exists() {
            return Err(CoreError::NotInitialized {
                path: db_path.display().to_string(),
            });
        }
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    /// Path to the statistics database.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open the statistics database and make sure its schema exists.
    pub fn open(&self) -> CoreResult<StatsDb> {
        let db = StatsDb::open(&self.db_path).map_err(CoreError::Internal)?;
        db.init_schema().map_err(CoreError::Internal)?;
        Ok(db)
    }

    /// Create a `StatsServices` instance backed by this context.
    pub fn services(&self) -> CoreResult<StatsServices> {
        let db = self.open()?;
        Ok(StatsServices {
            ctx: self.clone(),
            db,
        })
    }
}

/// Facade owning an open statistics database.
pub struct StatsServices {
    ctx: StatsContext,
    db: StatsDb,
}

impl StatsServices {
    /// Access timeline operations.
    #[must_use]
    pub const fn timeline(&self) -> timeline::TimelineService<'_> {
        timeline::TimelineService::new(&self.db)
    }

    /// Access the underlying database.
    #[must_use]
    pub const fn db(&self) -> &StatsDb {
        &self.db
    }

    /// Access the context.
    #[must_use]
    pub const fn context(&self) -> &StatsContext {
        &self.ctx
    }
}
