//! Bulk execution - effectful operations
//!
//! Takes a [`BulkPlan`] from the pure planner, applies the operation to each
//! pair through the platform API and records the outcome in the ledger.
//! Single-pair requests persist right away and surface the failure; scans
//! collect per-pair failures and persist once at the end.

use crate::bulk::plan::{BulkOperation, BulkPlan, BulkScope, BulkStep, plan_bulk};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::tracking::{CiStatus, Ledger, LedgerStore};
use tracing::{debug, info, warn};

/// A pair the operation failed on during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFailure {
    /// Original PR number
    pub number: u64,
    /// Target branch
    pub branch: String,
    /// Error message
    pub error: String,
}

/// Overall shape of a bulk run, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOutcome {
    /// No pair qualified; nothing was attempted
    NothingEligible,
    /// Every attempted pair failed
    AllFailed,
    /// At least one pair succeeded
    Completed,
}

/// Result of bulk execution
#[derive(Debug, Clone)]
pub struct BulkReport {
    /// Operation that ran
    pub operation: BulkOperation,
    /// Pairs that qualified
    pub eligible: usize,
    /// Pairs the operation succeeded on
    pub succeeded: Vec<(u64, String)>,
    /// Pairs the operation failed on
    pub failures: Vec<PairFailure>,
}

impl BulkReport {
    const fn new(operation: BulkOperation, eligible: usize) -> Self {
        Self {
            operation,
            eligible,
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Pairs the operation succeeded on
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.succeeded.len()
    }

    /// Pairs the operation failed on
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.failures.len()
    }

    /// Classify the run
    #[must_use]
    pub const fn outcome(&self) -> BulkOutcome {
        if self.eligible == 0 {
            BulkOutcome::NothingEligible
        } else if self.succeeded.is_empty() {
            BulkOutcome::AllFailed
        } else {
            BulkOutcome::Completed
        }
    }
}

/// Plan and execute a bulk operation (EFFECTFUL)
///
/// Precondition failures (untracked item, ineligible pair) return before any
/// platform call.
pub async fn execute_bulk(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    platform: &dyn PlatformService,
    operation: BulkOperation,
    scope: &BulkScope,
    progress: &dyn ProgressCallback,
) -> Result<BulkReport> {
    let plan = plan_bulk(ledger, operation, scope)?;
    debug!(%operation, eligible = plan.len(), ?scope, "bulk planned");

    if matches!(scope, BulkScope::Pair { .. }) {
        execute_pair(ledger, store, platform, &plan, progress).await
    } else {
        execute_scan(ledger, store, platform, &plan, progress).await
    }
}

async fn execute_pair(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    platform: &dyn PlatformService,
    plan: &BulkPlan,
    progress: &dyn ProgressCallback,
) -> Result<BulkReport> {
    let operation = plan.operation;
    let mut report = BulkReport::new(operation, plan.len());

    for step in &plan.steps {
        progress
            .on_pair_started(operation.name(), step.number, &step.branch)
            .await;
        if let Err(e) = apply_step(ledger, platform, operation, step).await {
            progress
                .on_pair_failed(operation.name(), step.number, &step.branch, &e)
                .await;
            return Err(e);
        }
        store.save(ledger)?;
        progress
            .on_pair_succeeded(operation.name(), step.number, &step.branch)
            .await;
        report.succeeded.push((step.number, step.branch.clone()));
    }

    Ok(report)
}

async fn execute_scan(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    platform: &dyn PlatformService,
    plan: &BulkPlan,
    progress: &dyn ProgressCallback,
) -> Result<BulkReport> {
    let operation = plan.operation;
    let mut report = BulkReport::new(operation, plan.len());

    if plan.is_empty() {
        progress
            .on_message(&format!("No pull requests eligible to {operation}"))
            .await;
        return Ok(report);
    }

    for step in &plan.steps {
        progress
            .on_pair_started(operation.name(), step.number, &step.branch)
            .await;
        match apply_step(ledger, platform, operation, step).await {
            Ok(()) => {
                progress
                    .on_pair_succeeded(operation.name(), step.number, &step.branch)
                    .await;
                report.succeeded.push((step.number, step.branch.clone()));
            }
            Err(e) => {
                warn!(number = step.number, branch = %step.branch, error = %e, "{operation} failed");
                progress
                    .on_pair_failed(operation.name(), step.number, &step.branch, &e)
                    .await;
                report.failures.push(PairFailure {
                    number: step.number,
                    branch: step.branch.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    store.save(ledger)?;
    info!(
        %operation,
        processed = report.processed(),
        errors = report.errors(),
        "bulk run finished"
    );
    Ok(report)
}

/// Apply the operation to one pair, then record it in the ledger
///
/// The ledger is only touched when the platform call succeeds.
async fn apply_step(
    ledger: &mut Ledger,
    platform: &dyn PlatformService,
    operation: BulkOperation,
    step: &BulkStep,
) -> Result<()> {
    match operation {
        BulkOperation::Merge => {
            let result = platform.squash_merge_pr(step.cherry_pick).await?;
            if !result.merged {
                return Err(Error::Platform(result.message.unwrap_or_else(|| {
                    format!("PR #{} was not merged", step.cherry_pick)
                })));
            }
            ledger
                .branch_status_mut(step.number, &step.branch)?
                .mark_merged()?;
            debug!(number = step.number, branch = %step.branch, sha = ?result.sha, "merged");
        }
        BulkOperation::Retry => {
            let rerun = platform.retry_failed_workflows(step.cherry_pick).await?;
            ledger
                .branch_status_mut(step.number, &step.branch)?
                .set_ci_status(CiStatus::Pending);
            debug!(number = step.number, branch = %step.branch, rerun, "workflows re-queued");
        }
    }
    Ok(())
}
