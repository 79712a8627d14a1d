//! Platform service factory
//!
//! Builds an authenticated service for the repository a ledger describes.

use crate::auth::get_github_auth;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;
use tracing::debug;

/// Create an authenticated platform service from configuration
pub async fn create_platform_service(
    config: &PlatformConfig,
) -> Result<Box<dyn PlatformService>> {
    let auth = get_github_auth(config.host.as_deref()).await?;
    debug!(source = ?auth.source, owner = %config.owner, repo = %config.repo, "connecting to GitHub");
    Ok(Box::new(GitHubService::new(
        &auth.token,
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?))
}
