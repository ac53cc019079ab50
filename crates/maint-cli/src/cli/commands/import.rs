//! Implementation of `maint-stats import` command.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::cli::commands::helpers::open_services;
use crate::output::Formatter;
use maint_core::config::StatsConfig;
use maint_core::records::RecordBundle;

/// Serializable output for the import command.
#[derive(Debug, Serialize)]
struct ImportOutput {
    file: String,
    records_imported: usize,
}

/// Load a JSON record bundle into the statistics database.
///
/// The bundle is imported in a single transaction; on failure nothing is
/// written.
#[tracing::instrument(skip(config, formatter))]
pub fn run_import(config: &StatsConfig, file: &Path, formatter: &Formatter) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read bundle: {}", file.display()))?;
    let bundle = RecordBundle::from_json(&json)
        .with_context(|| format!("Failed to parse bundle: {}", file.display()))?;

    let services = open_services(config)?;
    let records_imported = services.db().import_bundle(&bundle)?;
    tracing::info!(records = records_imported, "bundle imported");

    formatter.print(&ImportOutput {
        file: file.display().to_string(),
        records_imported,
    })
}
