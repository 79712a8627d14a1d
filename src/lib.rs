//! cherrytrack - drive backports of merged pull requests onto release branches
//!
//! A per-repository ledger records, for every tracked pull request, its
//! cherry-pick status on each target branch. Operations read and advance that
//! ledger:
//!
//! - [`cherry_pick::execute_pick`] redoes a failed automated cherry-pick by
//!   hand, handing conflicts to an interactive assistant and opening the
//!   cherry-pick PR
//! - [`bulk::execute_bulk`] merges or re-runs CI for every eligible pair
//! - [`bulk::refresh_ci_status`] and [`release::check_releases`] keep the
//!   ledger in step with CI and release tags

pub mod auth;
pub mod bulk;
pub mod cherry_pick;
pub mod error;
pub mod platform;
pub mod progress;
pub mod release;
pub mod repo;
pub mod tracking;
pub mod types;

pub use error::{Error, Result};
