//! Per-repository cherry-pick ledger
//!
//! The [`Ledger`] is the single mutable aggregate every operation works on.
//! Operations take it by `&mut` and persist it through a [`LedgerStore`].

mod status;
mod storage;

pub use status::{
    BranchStatus, CherryPickRef, CiStatus, Status, is_eligible_for_merge, is_eligible_for_pick,
    is_eligible_for_retry,
};
pub use storage::{FileLedgerStore, LEDGER_FILE, LedgerStore, ledger_path, load_ledger, save_ledger};

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A source pull request recorded for cross-branch cherry-picking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Original PR number (unique key)
    pub number: u64,
    /// Original PR title
    pub title: String,
    /// Target branch name → status on that branch
    #[serde(default)]
    pub branches: HashMap<String, BranchStatus>,
}

impl TrackedItem {
    /// New item pending on every given branch
    pub fn new<I, S>(number: u64, title: impl Into<String>, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            number,
            title: title.into(),
            branches: branches
                .into_iter()
                .map(|b| (b.into(), BranchStatus::pending()))
                .collect(),
        }
    }

    /// Status on one branch
    pub fn branch(&self, branch: &str) -> Result<&BranchStatus> {
        self.branches
            .get(branch)
            .ok_or_else(|| Error::BranchNotTracked {
                number: self.number,
                branch: branch.to_string(),
            })
    }

    /// Mutable status on one branch
    pub fn branch_mut(&mut self, branch: &str) -> Result<&mut BranchStatus> {
        let number = self.number;
        self.branches
            .get_mut(branch)
            .ok_or_else(|| Error::BranchNotTracked {
                number,
                branch: branch.to_string(),
            })
    }

    /// Branch names sorted, for stable output
    pub fn sorted_branches(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.branches.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Durable per-repository record of tracked items and settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// GitHub organization (or user) owning the repository
    pub org: String,
    /// Repository name
    pub repo: String,
    /// Branch the original PRs merge into
    pub source_branch: String,
    /// Command launching the interactive conflict assistant; empty when unset
    #[serde(default)]
    pub ai_assistant_command: String,
    /// When tracked items were last ingested from the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetch_date: Option<DateTime<Utc>>,
    /// Branch → newest release tag already checked
    #[serde(default)]
    pub last_checked_release: HashMap<String, String>,
    /// Tracked items in ingestion order
    #[serde(default)]
    pub tracked_items: Vec<TrackedItem>,
}

impl Ledger {
    /// Empty ledger for a repository
    pub fn new(
        org: impl Into<String>,
        repo: impl Into<String>,
        source_branch: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            source_branch: source_branch.into(),
            ai_assistant_command: String::new(),
            last_fetch_date: None,
            last_checked_release: HashMap::new(),
            tracked_items: Vec::new(),
        }
    }

    /// Configured assistant command, if any
    pub fn assistant_command(&self) -> Option<&str> {
        let cmd = self.ai_assistant_command.trim();
        (!cmd.is_empty()).then_some(cmd)
    }

    /// Add an item; numbers are unique
    pub fn track(&mut self, item: TrackedItem) -> Result<()> {
        if self.tracked_items.iter().any(|i| i.number == item.number) {
            return Err(Error::DuplicateItem(item.number));
        }
        self.tracked_items.push(item);
        Ok(())
    }

    /// Look up an item by original PR number
    pub fn item(&self, number: u64) -> Result<&TrackedItem> {
        self.tracked_items
            .iter()
            .find(|i| i.number == number)
            .ok_or(Error::ItemNotTracked(number))
    }

    /// Mutable lookup by original PR number
    pub fn item_mut(&mut self, number: u64) -> Result<&mut TrackedItem> {
        self.tracked_items
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(Error::ItemNotTracked(number))
    }

    /// Status of one (item, branch) pair
    pub fn branch_status(&self, number: u64, branch: &str) -> Result<&BranchStatus> {
        self.item(number)?.branch(branch)
    }

    /// Mutable status of one (item, branch) pair
    pub fn branch_status_mut(&mut self, number: u64, branch: &str) -> Result<&mut BranchStatus> {
        self.item_mut(number)?.branch_mut(branch)
    }

    /// Record that the upstream bot's attempt failed (pending → failed)
    pub fn mark_failed(&mut self, number: u64, branch: &str) -> Result<()> {
        self.branch_status_mut(number, branch)?.mark_failed()
    }

    /// Every target branch mentioned by any item, sorted and deduplicated
    pub fn target_branches(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tracked_items
            .iter()
            .flat_map(|i| i.branches.keys().cloned())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new("acme", "widgets", "main");
        ledger
            .track(TrackedItem::new(123, "Fix crash", ["release-1.0", "release-1.1"]))
            .unwrap();
        ledger
            .track(TrackedItem::new(124, "Bump deps", ["release-1.1"]))
            .unwrap();
        ledger
    }

    #[test]
    fn test_duplicate_track_rejected() {
        let mut ledger = sample_ledger();
        let err = ledger
            .track(TrackedItem::new(123, "Again", ["release-1.0"]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateItem(123)));
        assert_eq!(ledger.tracked_items.len(), 2);
    }

    #[test]
    fn test_lookup_errors_name_the_missing_key() {
        let ledger = sample_ledger();
        assert!(matches!(ledger.item(999), Err(Error::ItemNotTracked(999))));
        match ledger.branch_status(124, "release-1.0") {
            Err(Error::BranchNotTracked { number, branch }) => {
                assert_eq!(number, 124);
                assert_eq!(branch, "release-1.0");
            }
            other => panic!("Expected BranchNotTracked, got: {other:?}"),
        }
    }

    #[test]
    fn test_assistant_command_blank_is_unset() {
        let mut ledger = sample_ledger();
        assert_eq!(ledger.assistant_command(), None);
        ledger.ai_assistant_command = "   ".to_string();
        assert_eq!(ledger.assistant_command(), None);
        ledger.ai_assistant_command = "claude".to_string();
        assert_eq!(ledger.assistant_command(), Some("claude"));
    }

    #[test]
    fn test_target_branches_deduplicated() {
        let ledger = sample_ledger();
        assert_eq!(ledger.target_branches(), vec!["release-1.0", "release-1.1"]);
    }

    #[test]
    fn test_mark_failed_only_from_pending() {
        let mut ledger = sample_ledger();
        ledger.mark_failed(123, "release-1.0").unwrap();
        assert_eq!(
            ledger.branch_status(123, "release-1.0").unwrap().status,
            Status::Failed
        );
        assert!(ledger.mark_failed(123, "release-1.0").is_err());
    }
}
