//! Pick planning - pure validation before any git or API call

use crate::error::{Error, Result};
use crate::tracking::{Ledger, is_eligible_for_pick};

/// Branch-name prefix stripped to get the version token in PR titles
pub const RELEASE_BRANCH_PREFIX: &str = "release-";

/// A validated pick request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickPlan {
    /// Original PR number
    pub number: u64,
    /// Original PR title, as tracked
    pub title: String,
    /// Target branches to pick onto, sorted
    pub branches: Vec<String>,
}

/// Validate a pick of `number` onto one branch, or onto every failed branch
///
/// A named branch must be tracked and exactly `failed`. Without a branch, at
/// least one branch must be `failed`.
pub fn plan_pick(ledger: &Ledger, number: u64, branch: Option<&str>) -> Result<PickPlan> {
    let item = ledger.item(number)?;

    let branches = if let Some(branch) = branch {
        let status = item.branch(branch)?;
        if !is_eligible_for_pick(status) {
            return Err(Error::NotFailed {
                number,
                branch: branch.to_string(),
                status: status.status,
            });
        }
        vec![branch.to_string()]
    } else {
        let failed: Vec<String> = item
            .sorted_branches()
            .into_iter()
            .filter(|b| item.branches.get(*b).is_some_and(is_eligible_for_pick))
            .map(ToString::to_string)
            .collect();
        if failed.is_empty() {
            return Err(Error::NothingToPick(number));
        }
        failed
    };

    Ok(PickPlan {
        number,
        title: item.title.clone(),
        branches,
    })
}

/// Scratch branch a pick is built on
pub fn scratch_branch(number: u64, branch: &str) -> String {
    format!("cherry-pick-{number}-{branch}")
}

/// Version token for a target branch (`release-1.2` → `1.2`)
pub fn version_token(branch: &str) -> &str {
    branch
        .strip_prefix(RELEASE_BRANCH_PREFIX)
        .filter(|v| !v.is_empty())
        .unwrap_or(branch)
}

/// Title of the cherry-pick PR
pub fn cherry_pick_title(title: &str, number: u64, branch: &str) -> String {
    format!("[{}] {title} (#{number})", version_token(branch))
}

/// Body of the cherry-pick PR, cross-referencing the original
pub fn cherry_pick_body(number: u64, branch: &str) -> String {
    format!("Cherry-pick of #{number} onto `{branch}`.")
}
