//! Per-branch cherry-pick lifecycle and eligibility predicates.
//!
//! Everything here is pure: no I/O, no platform calls.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a cherry-pick onto one target branch
///
/// Legal transitions: pending → failed → picked → merged → released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not yet attempted by the upstream bot
    Pending,
    /// Bot attempted the pick and failed
    Failed,
    /// Cherry-pick PR is open
    Picked,
    /// Cherry-pick PR is merged
    Merged,
    /// Merged change is contained in a release tag
    Released,
}

impl Status {
    /// Whether `self -> next` is a legal lifecycle step
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Failed)
                | (Self::Failed, Self::Picked)
                | (Self::Picked, Self::Merged)
                | (Self::Merged, Self::Released)
        )
    }

    /// Whether a cherry-pick PR must exist in this status
    pub const fn requires_cherry_pick(self) -> bool {
        matches!(self, Self::Picked | Self::Merged | Self::Released)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Failed => write!(f, "failed"),
            Self::Picked => write!(f, "picked"),
            Self::Merged => write!(f, "merged"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// CI state of a cherry-pick PR
///
/// Unrecognized tokens read from the ledger become [`CiStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CiStatus {
    /// All checks green
    Passing,
    /// At least one check failed
    Failing,
    /// Checks still running
    Pending,
    /// Not known
    #[default]
    Unknown,
}

impl From<&str> for CiStatus {
    fn from(token: &str) -> Self {
        match token {
            "passing" => Self::Passing,
            "failing" => Self::Failing,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for CiStatus {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

impl fmt::Display for CiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passing => write!(f, "passing"),
            Self::Failing => write!(f, "failing"),
            Self::Pending => write!(f, "pending"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The PR opened against a target branch carrying the cherry-picked commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CherryPickRef {
    /// Cherry-pick PR number
    pub number: u64,
    /// Cherry-pick PR title
    pub title: String,
    /// Last known CI state
    #[serde(default)]
    pub ci_status: CiStatus,
}

/// Status of one tracked item on one target branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStatus {
    /// Lifecycle state
    pub status: Status,
    /// Present iff status is picked, merged or released
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cherry_pick: Option<CherryPickRef>,
}

impl BranchStatus {
    /// Fresh, not yet attempted
    pub const fn pending() -> Self {
        Self {
            status: Status::Pending,
            cherry_pick: None,
        }
    }

    /// Bot attempt failed
    pub const fn failed() -> Self {
        Self {
            status: Status::Failed,
            cherry_pick: None,
        }
    }

    /// Whether the ref-presence invariant holds
    pub const fn is_consistent(&self) -> bool {
        self.status.requires_cherry_pick() == self.cherry_pick.is_some()
    }

    /// CI state of the cherry-pick PR, if there is one
    pub fn ci_status(&self) -> Option<CiStatus> {
        self.cherry_pick.as_ref().map(|cp| cp.ci_status)
    }

    /// pending → failed
    pub fn mark_failed(&mut self) -> Result<()> {
        self.check_transition(Status::Failed)?;
        self.status = Status::Failed;
        Ok(())
    }

    /// failed → picked, recording the new cherry-pick PR
    pub fn mark_picked(&mut self, cherry_pick: CherryPickRef) -> Result<()> {
        self.check_transition(Status::Picked)?;
        self.status = Status::Picked;
        self.cherry_pick = Some(cherry_pick);
        Ok(())
    }

    /// picked → merged
    pub fn mark_merged(&mut self) -> Result<()> {
        self.check_transition(Status::Merged)?;
        self.status = Status::Merged;
        Ok(())
    }

    /// merged → released
    pub fn mark_released(&mut self) -> Result<()> {
        self.check_transition(Status::Released)?;
        self.status = Status::Released;
        Ok(())
    }

    /// Update the CI state of the cherry-pick PR; no-op without one
    pub fn set_ci_status(&mut self, ci_status: CiStatus) {
        if let Some(cp) = self.cherry_pick.as_mut() {
            cp.ci_status = ci_status;
        }
    }

    fn check_transition(&self, to: Status) -> Result<()> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }
}

/// Picked, has a cherry-pick PR, and CI is passing
pub fn is_eligible_for_merge(status: &BranchStatus) -> bool {
    status.status == Status::Picked && status.ci_status() == Some(CiStatus::Passing)
}

/// Picked, has a cherry-pick PR, and CI is failing
pub fn is_eligible_for_retry(status: &BranchStatus) -> bool {
    status.status == Status::Picked && status.ci_status() == Some(CiStatus::Failing)
}

/// Only a failed bot attempt may be picked by hand
pub fn is_eligible_for_pick(status: &BranchStatus) -> bool {
    status.status == Status::Failed
}
