//! Error types for cherrytrack

use crate::tracking::Status;
use crate::types::PrState;
use thiserror::Error;

/// Errors produced by ledger, git, assistant and platform operations
#[derive(Debug, Error)]
pub enum Error {
    // =========================================================================
    // Preconditions (reported before any side effect)
    // =========================================================================
    /// The pull request has no entry in the ledger
    #[error("PR #{0} is not tracked")]
    ItemNotTracked(u64),

    /// The pull request is tracked but not for this branch
    #[error("PR #{number} is not tracked for branch '{branch}'")]
    BranchNotTracked {
        /// Original PR number
        number: u64,
        /// Target branch name
        branch: String,
    },

    /// A pick was requested for a branch whose status is not `failed`
    #[error(
        "PR #{number} on '{branch}' is {status}, not failed status; only picks the bot already attempted can be redone by hand"
    )]
    NotFailed {
        /// Original PR number
        number: u64,
        /// Target branch name
        branch: String,
        /// Current status
        status: Status,
    },

    /// No branch of the item is in `failed` status
    #[error("PR #{0} has no branches in failed status")]
    NothingToPick(u64),

    /// A bulk operation was requested for a single pair that does not qualify
    #[error("cannot {operation} PR #{number} on '{branch}': {reason}")]
    NotEligible {
        /// Operation name
        operation: String,
        /// Original PR number
        number: u64,
        /// Target branch name
        branch: String,
        /// Why the pair does not qualify
        reason: String,
    },

    /// Status change outside the legal lifecycle
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: Status,
        /// Requested status
        to: Status,
    },

    /// Item number already present in the ledger
    #[error("PR #{0} is already tracked")]
    DuplicateItem(u64),

    /// The source PR has not landed, so there is no commit to pick
    #[error("PR #{number} is {state}, not merged; only merged PRs can be cherry-picked")]
    SourceNotMerged {
        /// Original PR number
        number: u64,
        /// State reported by the platform
        state: PrState,
    },

    // =========================================================================
    // Conflict escalation
    // =========================================================================
    /// Conflict exit status but git reports no conflicted paths
    #[error("cherry-pick reported conflicts but no conflicted files were found")]
    NoConflictedFiles,

    /// Conflicts need an assistant and none is configured
    #[error(
        "cherry-pick has conflicts and no AI assistant is configured; set one with `cherrytrack config --assistant <command>`"
    )]
    AssistantNotConfigured,

    /// Configured assistant cannot be resolved to an executable
    #[error("AI assistant '{0}' was not found on PATH")]
    AssistantNotFound(String),

    /// Conflict markers remain after the assistant session
    #[error(
        "conflicts remain in {}: resolve them and run `git cherry-pick --continue`, or `git cherry-pick --abort`",
        .0.join(", ")
    )]
    UnresolvedConflicts(Vec<String>),

    // =========================================================================
    // External calls
    // =========================================================================
    /// A git subprocess exited unsuccessfully
    #[error("`git {command}` failed: {stderr}")]
    Git {
        /// Arguments passed to git
        command: String,
        /// Trimmed stderr output
        stderr: String,
    },

    /// The cherry-pick itself failed for a reason other than conflicts
    #[error("cherry-pick of {commit} onto '{branch}' failed: {reason}")]
    CherryPickFailed {
        /// Commit being picked
        commit: String,
        /// Target branch
        branch: String,
        /// git's explanation
        reason: String,
    },

    /// Authentication could not be established
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub REST call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure
    #[error("platform error: {0}")]
    Platform(String),

    /// Ledger could not be read or written
    #[error("ledger error: {0}")]
    Tracking(String),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bug or unexpected state
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error was raised by request validation, before any side effect
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ItemNotTracked(_)
                | Self::BranchNotTracked { .. }
                | Self::NotFailed { .. }
                | Self::NothingToPick(_)
                | Self::NotEligible { .. }
                | Self::InvalidTransition { .. }
                | Self::DuplicateItem(_)
        )
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
