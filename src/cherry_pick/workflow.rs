//! Pick execution - effectful git, assistant and platform steps
//!
//! Per branch: sync → attempt → (conflict → assistant) → normalize →
//! publish → record. Each completed branch is persisted before the next one
//! starts, so a request that fails partway keeps earlier progress.

use crate::cherry_pick::assistant::{Assistant, ConflictContext};
use crate::cherry_pick::message::{needs_normalization, normalize_signoffs};
use crate::cherry_pick::plan::{
    PickPlan, cherry_pick_body, cherry_pick_title, plan_pick, scratch_branch,
};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::repo::{CherryPickAttempt, GitRepo};
use crate::tracking::{CherryPickRef, CiStatus, Ledger, LedgerStore};
use crate::types::{PrState, PullRequest};
use tracing::{debug, info};

const OPERATION: &str = "pick";

/// A branch picked successfully
#[derive(Debug, Clone)]
pub struct PickedBranch {
    /// Target branch
    pub branch: String,
    /// The cherry-pick PR opened against it
    pub pr: PullRequest,
}

/// Result of pick execution
#[derive(Debug, Clone, Default)]
pub struct PickResult {
    /// Branches picked, in processing order
    pub picked: Vec<PickedBranch>,
}

/// Pick PR `number` onto `branch`, or onto every failed branch (EFFECTFUL)
///
/// Validation happens before any external call. A source PR that is not
/// merged is rejected before git is touched. Fetch failures abort the
/// whole request. A branch failure stops the request; branches already
/// picked stay recorded.
pub async fn execute_pick(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    repo: &GitRepo,
    platform: &dyn PlatformService,
    number: u64,
    branch: Option<&str>,
    progress: &dyn ProgressCallback,
) -> Result<PickResult> {
    let plan = plan_pick(ledger, number, branch)?;

    let source = platform.get_pr(number).await?;
    if source.state != PrState::Merged {
        return Err(Error::SourceNotMerged {
            number,
            state: source.state,
        });
    }
    let commit = source.pick_sha().to_string();
    let title = if source.title.is_empty() {
        plan.title.clone()
    } else {
        source.title.clone()
    };
    debug!(number, %commit, branches = ?plan.branches, "pick planned");

    progress
        .on_message(&format!("Fetching from {}...", repo.remote()))
        .await;
    repo.fetch()?;

    let assistant_command = ledger.assistant_command().map(ToString::to_string);
    let mut result = PickResult::default();

    for branch in &plan.branches {
        progress.on_pair_started(OPERATION, number, branch).await;

        let pr = match pick_onto_branch(
            repo,
            platform,
            &plan,
            &title,
            branch,
            &commit,
            assistant_command.as_deref(),
        )
        .await
        {
            Ok(pr) => pr,
            Err(e) => {
                progress.on_pair_failed(OPERATION, number, branch, &e).await;
                return Err(e);
            }
        };
        progress.on_pr_created(branch, &pr).await;

        ledger
            .branch_status_mut(number, branch)?
            .mark_picked(CherryPickRef {
                number: pr.number,
                title: pr.title.clone(),
                ci_status: CiStatus::Pending,
            })?;
        store.save(ledger)?;
        info!(number, %branch, cherry_pick = pr.number, "recorded pick");

        progress.on_pair_succeeded(OPERATION, number, branch).await;
        result.picked.push(PickedBranch {
            branch: branch.clone(),
            pr,
        });
    }

    Ok(result)
}

async fn pick_onto_branch(
    repo: &GitRepo,
    platform: &dyn PlatformService,
    plan: &PickPlan,
    title: &str,
    branch: &str,
    commit: &str,
    assistant_command: Option<&str>,
) -> Result<PullRequest> {
    let scratch = scratch_branch(plan.number, branch);

    repo.checkout_remote_branch(branch)?;
    repo.delete_local_branch(&scratch)?;
    repo.delete_remote_branch(&scratch)?;
    repo.create_branch(&scratch)?;

    match repo.cherry_pick(commit)? {
        CherryPickAttempt::Clean => debug!(%branch, "cherry-pick applied cleanly"),
        CherryPickAttempt::Conflicted => {
            resolve_conflicts(repo, branch, commit, assistant_command)?;
        }
        CherryPickAttempt::Failed(reason) => {
            return Err(Error::CherryPickFailed {
                commit: commit.to_string(),
                branch: branch.to_string(),
                reason,
            });
        }
    }

    normalize_head_message(repo)?;

    repo.push(&scratch)?;
    platform
        .create_pr(
            &cherry_pick_title(title, plan.number, branch),
            &cherry_pick_body(plan.number, branch),
            &scratch,
            branch,
        )
        .await
}

/// Hand a conflicted cherry-pick to the assistant and finish it afterwards
///
/// Never aborts the cherry-pick: on any error the working tree is left as is
/// for manual completion.
pub fn resolve_conflicts(
    repo: &GitRepo,
    branch: &str,
    commit: &str,
    assistant_command: Option<&str>,
) -> Result<()> {
    let conflicted = repo.conflicted_files()?;
    if conflicted.is_empty() {
        return Err(Error::NoConflictedFiles);
    }
    info!(%branch, files = conflicted.len(), "cherry-pick conflicted");

    let assistant = Assistant::from_command(assistant_command)?;
    let context = ConflictContext {
        commit_description: repo.describe_commit(commit)?,
        branch: branch.to_string(),
        conflicted_files: conflicted.clone(),
    };
    assistant.launch(repo.root(), &context)?;

    let remaining = repo.files_with_conflict_markers(&conflicted)?;
    if !remaining.is_empty() {
        return Err(Error::UnresolvedConflicts(remaining));
    }

    if repo.cherry_pick_in_progress()? {
        repo.stage(&conflicted)?;
        repo.cherry_pick_continue()?;
        debug!("completed cherry-pick after assistant session");
    } else {
        debug!("assistant already completed the cherry-pick");
    }
    Ok(())
}

/// Amend HEAD so sign-offs form one trailing block; returns whether it amended
pub fn normalize_head_message(repo: &GitRepo) -> Result<bool> {
    let message = repo.head_message()?;
    if !needs_normalization(&message) {
        return Ok(false);
    }
    repo.amend_message(&normalize_signoffs(&message))?;
    debug!("normalized sign-off trailers");
    Ok(true)
}
