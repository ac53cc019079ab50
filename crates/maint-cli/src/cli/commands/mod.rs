//! Command implementations.

pub mod helpers;
pub mod import;
pub mod init;
pub mod timeline;

pub use import::run_import;
pub use init::run_init;
pub use timeline::run_timeline;
