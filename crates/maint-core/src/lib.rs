//! maint-core - maintenance statistics for build-service projects.
//!
//! This crate owns the source record model, the SQLite statistics store, and
//! the timeline aggregation that turns a project's records into an ordered
//! list of lifecycle events.

pub mod config;
pub mod core;
pub mod records;
pub mod source;
pub mod store;
pub mod timeline;
