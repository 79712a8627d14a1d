//! Bulk planning - pure functions selecting eligible (PR, branch) pairs
//!
//! No I/O happens here. Planning runs before any platform call, so a
//! malformed request fails without spending API quota.

use crate::error::{Error, Result};
use crate::tracking::{
    BranchStatus, Ledger, Status, TrackedItem, is_eligible_for_merge, is_eligible_for_retry,
};
use std::fmt;

/// Operations the bulk engine can fan out, each paired with its predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    /// Squash-merge cherry-pick PRs whose CI is passing
    Merge,
    /// Re-run failed workflows of cherry-pick PRs whose CI is failing
    Retry,
}

impl BulkOperation {
    /// Whether a branch status qualifies for this operation
    pub fn is_eligible(self, status: &BranchStatus) -> bool {
        match self {
            Self::Merge => is_eligible_for_merge(status),
            Self::Retry => is_eligible_for_retry(status),
        }
    }

    /// Lowercase verb, used in messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Retry => "retry",
        }
    }

    fn ineligible_reason(self, status: &BranchStatus) -> String {
        if status.status != Status::Picked {
            return format!("status is {}, not picked", status.status);
        }
        match (self, status.ci_status()) {
            (_, None) => "no cherry-pick PR is recorded".to_string(),
            (Self::Merge, Some(ci)) => format!("CI is {ci}, not passing"),
            (Self::Retry, Some(ci)) => format!("CI is {ci}, not failing"),
        }
    }
}

impl fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which pairs a bulk request covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkScope {
    /// One named branch of one item; must be eligible
    Pair {
        /// Original PR number
        number: u64,
        /// Target branch
        branch: String,
    },
    /// Every eligible branch of one item
    Item(u64),
    /// Every eligible pair in the ledger
    All,
}

impl BulkScope {
    /// Scope from optional CLI-style arguments
    pub fn from_args(number: Option<u64>, branch: Option<&str>) -> Self {
        match (number, branch) {
            (Some(number), Some(branch)) => Self::Pair {
                number,
                branch: branch.to_string(),
            },
            (Some(number), None) => Self::Item(number),
            (None, _) => Self::All,
        }
    }
}

/// One eligible pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkStep {
    /// Original PR number
    pub number: u64,
    /// Original PR title
    pub title: String,
    /// Target branch
    pub branch: String,
    /// Cherry-pick PR the operation acts on
    pub cherry_pick: u64,
}

impl fmt::Display for BulkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} on {} (cherry-pick #{}): {}",
            self.number, self.branch, self.cherry_pick, self.title
        )
    }
}

/// Bulk plan - the functional core output
#[derive(Debug, Clone)]
pub struct BulkPlan {
    /// Operation to apply
    pub operation: BulkOperation,
    /// Eligible pairs, items in ledger order
    pub steps: Vec<BulkStep>,
}

impl BulkPlan {
    /// Whether nothing is eligible
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of eligible pairs
    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps.len()
    }
}

fn step_for(item: &TrackedItem, branch: &str, status: &BranchStatus) -> Option<BulkStep> {
    let cherry_pick = status.cherry_pick.as_ref()?;
    Some(BulkStep {
        number: item.number,
        title: item.title.clone(),
        branch: branch.to_string(),
        cherry_pick: cherry_pick.number,
    })
}

fn eligible_steps(item: &TrackedItem, operation: BulkOperation) -> impl Iterator<Item = BulkStep> {
    item.branches
        .iter()
        .filter(move |(_, status)| operation.is_eligible(status))
        .filter_map(move |(branch, status)| step_for(item, branch, status))
}

/// Validate one named pair for `operation`
pub fn validate_pair(
    ledger: &Ledger,
    operation: BulkOperation,
    number: u64,
    branch: &str,
) -> Result<BulkStep> {
    let item = ledger.item(number)?;
    let status = item.branch(branch)?;

    if !operation.is_eligible(status) {
        return Err(Error::NotEligible {
            operation: operation.name().to_string(),
            number,
            branch: branch.to_string(),
            reason: operation.ineligible_reason(status),
        });
    }

    step_for(item, branch, status)
        .ok_or_else(|| Error::Internal("eligible pair without cherry-pick PR".to_string()))
}

/// Create a bulk plan (PURE - no I/O, easily testable)
///
/// `Pair` scopes fail unless the pair is eligible; `Item` fails only when
/// the item is not tracked. An empty plan means nothing is eligible.
pub fn plan_bulk(ledger: &Ledger, operation: BulkOperation, scope: &BulkScope) -> Result<BulkPlan> {
    let steps = match scope {
        BulkScope::Pair { number, branch } => {
            vec![validate_pair(ledger, operation, *number, branch)?]
        }
        BulkScope::Item(number) => eligible_steps(ledger.item(*number)?, operation).collect(),
        BulkScope::All => ledger
            .tracked_items
            .iter()
            .flat_map(|item| eligible_steps(item, operation))
            .collect(),
    };

    Ok(BulkPlan { operation, steps })
}
