//! Shared test utilities

#![allow(dead_code)]

pub mod git_repo;
mod mock_platform;

pub use git_repo::TempGitRepo;
pub use mock_platform::{CreatePrCall, MockPlatformService};

use cherrytrack::error::Result;
use cherrytrack::tracking::{
    BranchStatus, CherryPickRef, CiStatus, Ledger, LedgerStore, Status, TrackedItem,
};
use std::sync::Mutex;

/// Mock platform for the test repository
pub fn mock_platform() -> MockPlatformService {
    MockPlatformService::new()
}

/// Ledger store that keeps every saved snapshot in memory
#[derive(Default)]
pub struct RecordingStore {
    saves: Mutex<Vec<Ledger>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `save` was called
    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    /// Most recent snapshot
    pub fn last_saved(&self) -> Option<Ledger> {
        self.saves.lock().unwrap().last().cloned()
    }
}

impl LedgerStore for RecordingStore {
    fn save(&self, ledger: &Ledger) -> Result<()> {
        self.saves.lock().unwrap().push(ledger.clone());
        Ok(())
    }
}

/// Branch status with an open cherry-pick PR
pub fn picked(cherry_pick: u64, ci_status: CiStatus) -> BranchStatus {
    BranchStatus {
        status: Status::Picked,
        cherry_pick: Some(CherryPickRef {
            number: cherry_pick,
            title: format!("cherry-pick #{cherry_pick}"),
            ci_status,
        }),
    }
}

/// Branch status of a merged cherry-pick PR
pub fn merged(cherry_pick: u64) -> BranchStatus {
    BranchStatus {
        status: Status::Merged,
        ..picked(cherry_pick, CiStatus::Passing)
    }
}

/// Tracked item with explicit per-branch statuses
pub fn make_item(number: u64, title: &str, branches: Vec<(&str, BranchStatus)>) -> TrackedItem {
    TrackedItem {
        number,
        title: title.to_string(),
        branches: branches
            .into_iter()
            .map(|(b, s)| (b.to_string(), s))
            .collect(),
    }
}

/// Empty ledger for the test repository
pub fn make_ledger(items: Vec<TrackedItem>) -> Ledger {
    let mut ledger = Ledger::new("acme", "widgets", "main");
    for item in items {
        ledger.track(item).unwrap();
    }
    ledger
}
