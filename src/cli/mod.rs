//! CLI commands
//!
//! Command implementations for the `cherrytrack` binary.

mod bulk;
mod context;
mod ledger;
mod pick;
mod progress;
mod refresh;
mod releases;
mod style;

pub use bulk::{BulkOptions, run_bulk};
pub use context::GlobalOptions;
pub use ledger::{run_config, run_init, run_mark_failed, run_status, run_track};
pub use pick::run_pick;
pub use progress::CliProgress;
pub use refresh::run_refresh;
pub use releases::run_check_releases;
