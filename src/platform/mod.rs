//! Hosting-service client contract and its GitHub implementation
//!
//! The rest of the crate talks to the code-review service only through
//! [`PlatformService`], so engines can be driven by a mock in tests.

mod factory;
mod github;

pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::tracking::CiStatus;
use crate::types::{MergeResult, PullRequest, PullRequestDetails};
use async_trait::async_trait;

/// Narrow client contract consumed by the bulk engine and pick workflow
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch a PR with the commit needed to cherry-pick it
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequestDetails>;

    /// Open a PR from `head` into `base`
    async fn create_pr(&self, title: &str, body: &str, head: &str, base: &str)
    -> Result<PullRequest>;

    /// Squash-merge a PR; the commit title is the PR title plus `(#N)`
    async fn squash_merge_pr(&self, pr_number: u64) -> Result<MergeResult>;

    /// Re-run the failed workflow runs of a PR's head commit
    ///
    /// Returns how many runs were re-queued.
    async fn retry_failed_workflows(&self, pr_number: u64) -> Result<usize>;

    /// Current CI state of a PR's head commit
    async fn get_ci_status(&self, pr_number: u64) -> Result<CiStatus>;
}
