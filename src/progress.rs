//! Progress callback trait for interface-agnostic updates
//!
//! Engines report what they are doing through this trait so the CLI (or a
//! test) decides how to show it.

use crate::error::Error;
use crate::types::PullRequest;
use async_trait::async_trait;

/// Progress callback trait
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// An operation is starting on one (PR, branch) pair
    async fn on_pair_started(&self, operation: &str, number: u64, branch: &str);

    /// The operation succeeded on the pair
    async fn on_pair_succeeded(&self, operation: &str, number: u64, branch: &str);

    /// The operation failed on the pair (non-fatal in bulk scans)
    async fn on_pair_failed(&self, operation: &str, number: u64, branch: &str, error: &Error);

    /// A cherry-pick PR was opened
    async fn on_pr_created(&self, branch: &str, pr: &PullRequest);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_pair_started(&self, _operation: &str, _number: u64, _branch: &str) {}
    async fn on_pair_succeeded(&self, _operation: &str, _number: u64, _branch: &str) {}
    async fn on_pair_failed(&self, _operation: &str, _number: u64, _branch: &str, _error: &Error) {
    }
    async fn on_pr_created(&self, _branch: &str, _pr: &PullRequest) {}
    async fn on_message(&self, _message: &str) {}
}
