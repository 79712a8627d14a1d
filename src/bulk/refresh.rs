//! CI refresh - pull current CI state for open cherry-pick PRs

use crate::bulk::execute::PairFailure;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::tracking::{CiStatus, Ledger, LedgerStore, Status};
use tracing::{debug, warn};

const OPERATION: &str = "refresh";

/// Result of a CI refresh
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Picked pairs queried
    pub checked: usize,
    /// Pairs whose CI state changed, with the new state
    pub changed: Vec<(u64, String, CiStatus)>,
    /// Pairs whose lookup failed
    pub failures: Vec<PairFailure>,
}

/// Query CI for every picked pair, or for one item's picked pairs
///
/// Lookup failures are collected per pair. The ledger is saved once, and
/// only when some state changed.
pub async fn refresh_ci_status(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    platform: &dyn PlatformService,
    number: Option<u64>,
    progress: &dyn ProgressCallback,
) -> Result<RefreshReport> {
    if let Some(number) = number {
        ledger.item(number)?;
    }

    let targets: Vec<(u64, String, u64)> = ledger
        .tracked_items
        .iter()
        .filter(|item| number.is_none_or(|n| n == item.number))
        .flat_map(|item| {
            item.sorted_branches().into_iter().filter_map(move |branch| {
                let status = item.branches.get(branch)?;
                let cp = status.cherry_pick.as_ref()?;
                (status.status == Status::Picked).then(|| (item.number, branch.to_string(), cp.number))
            })
        })
        .collect();

    let mut report = RefreshReport {
        checked: targets.len(),
        ..RefreshReport::default()
    };

    for (number, branch, cherry_pick) in targets {
        progress.on_pair_started(OPERATION, number, &branch).await;
        let ci = match platform.get_ci_status(cherry_pick).await {
            Ok(ci) => ci,
            Err(e) => {
                warn!(number, %branch, error = %e, "CI lookup failed");
                progress.on_pair_failed(OPERATION, number, &branch, &e).await;
                report.failures.push(PairFailure {
                    number,
                    branch,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let status = ledger.branch_status_mut(number, &branch)?;
        if status.ci_status() != Some(ci) {
            debug!(number, %branch, %ci, "CI state changed");
            status.set_ci_status(ci);
            report.changed.push((number, branch.clone(), ci));
        }
        progress.on_pair_succeeded(OPERATION, number, &branch).await;
    }

    if !report.changed.is_empty() {
        store.save(ledger)?;
    }
    Ok(report)
}
