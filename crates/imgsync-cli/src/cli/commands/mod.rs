//! CLI command handlers, one per file.

mod config_path;
mod extract;
mod restore;
mod run;

pub use config_path::run_config_path;
pub use extract::run_extract;
pub use restore::run_restore;
pub use run::run_pipeline;
