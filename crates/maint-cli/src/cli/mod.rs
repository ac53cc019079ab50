//! CLI command definitions and handlers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

pub mod commands;

/// Maintenance statistics for build-service projects
#[derive(Parser, Debug)]
#[command(name = "maint-stats")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Statistics database (default: $MAINT_STATS_DB or .maint/stats.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty statistics database
    Init,

    /// Load projects, requests, reviews and issues from a JSON record bundle
    Import {
        /// Path to the bundle file
        file: PathBuf,
    },

    /// Show the maintenance timeline of a project, oldest event first
    Timeline {
        /// Project name
        project: String,
    },
}
