//! maint-stats - maintenance statistics for build-service projects

use anyhow::Result;
use clap::Parser;
use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod output;

use cli::commands::{run_import, run_init, run_timeline};
use cli::{Cli, Commands};
use maint_core::config::StatsConfig;
use output::Formatter;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cwd = env::current_dir()?;
    let config = StatsConfig::resolve(cli.db.as_deref(), &cwd);
    let formatter = Formatter::new(cli.format);

    tracing::debug!(db = %config.db_path.display(), "resolved configuration");

    match cli.command {
        Commands::Init => run_init(&config),
        Commands::Import { file } => run_import(&config, &file, &formatter),
        Commands::Timeline { project } => run_timeline(&config, &project, &formatter),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MAINT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "maint=debug,info"
        } else {
            "maint=info,warn"
        })
    });

    let format = env::var("MAINT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
