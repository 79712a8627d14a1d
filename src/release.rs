//! Release detection - promote merged cherry-picks once a tag contains them
//!
//! Squash merges title the landed commit `<title> (#N)`, where `N` is the
//! cherry-pick PR. A merged pair is released once a tag on its branch reaches
//! a commit carrying that suffix.

use crate::error::Result;
use crate::repo::GitRepo;
use crate::tracking::{Ledger, LedgerStore, Status};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info};

static SQUASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#(\d+)\)\s*$").expect("squash suffix pattern is valid"));

/// What one release check found
#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    /// Branches whose newest tag changed, with that tag
    pub new_tags: Vec<(String, String)>,
    /// Pairs promoted to released
    pub released: Vec<(u64, String)>,
}

/// PR numbers of the trailing `(#N)` squash suffix of commit subjects
///
/// Earlier `(#N)` references in a subject name the original PR, not the one
/// that landed the commit, and are ignored.
pub fn referenced_numbers<S: AsRef<str>>(subjects: &[S]) -> HashSet<u64> {
    subjects
        .iter()
        .filter_map(|s| SQUASH_SUFFIX.captures(s.as_ref()))
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

/// Check every target branch for a new release tag (EFFECTFUL)
///
/// Fetches first. Branches whose newest tag equals `last_checked_release`
/// are skipped. The ledger is saved once if anything changed.
pub fn check_releases(
    ledger: &mut Ledger,
    store: &dyn LedgerStore,
    repo: &GitRepo,
) -> Result<ReleaseReport> {
    repo.fetch()?;
    let mut report = ReleaseReport::default();

    for branch in ledger.target_branches() {
        let Some(tag) = repo.latest_tag(&branch)? else {
            debug!(%branch, "no release tag");
            continue;
        };
        if ledger.last_checked_release.get(&branch) == Some(&tag) {
            debug!(%branch, %tag, "tag already checked");
            continue;
        }

        let shipped = referenced_numbers(&repo.commit_subjects(&tag)?);
        for item in &mut ledger.tracked_items {
            let Some(status) = item.branches.get_mut(&branch) else {
                continue;
            };
            let Some(cherry_pick) = status.cherry_pick.as_ref() else {
                continue;
            };
            if status.status == Status::Merged && shipped.contains(&cherry_pick.number) {
                status.mark_released()?;
                info!(number = item.number, %branch, %tag, "released");
                report.released.push((item.number, branch.clone()));
            }
        }

        ledger.last_checked_release.insert(branch.clone(), tag.clone());
        report.new_tags.push((branch, tag));
    }

    if !report.new_tags.is_empty() {
        store.save(ledger)?;
    }
    Ok(report)
}
