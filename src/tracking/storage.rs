//! Persistence for the ledger file (`.cherrytrack.toml` at the repository root).

use super::Ledger;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default ledger filename, relative to the repository root.
pub const LEDGER_FILE: &str = ".cherrytrack.toml";

/// Where operations send the ledger after mutating it.
///
/// Operations decide *when* to persist; the store decides *where*.
pub trait LedgerStore {
    /// Durably write the ledger.
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Ledger store backed by a TOML file.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    /// Store writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger this store writes.
    pub fn load(&self) -> Result<Ledger> {
        load_ledger(&self.path)
    }
}

impl LedgerStore for FileLedgerStore {
    fn save(&self, ledger: &Ledger) -> Result<()> {
        save_ledger(&self.path, ledger)
    }
}

/// Default ledger path for a repository root.
pub fn ledger_path(repo_root: &Path) -> PathBuf {
    repo_root.join(LEDGER_FILE)
}

/// Load the ledger from disk.
///
/// A missing file is an error: the ledger carries org/repo settings that
/// nothing else can supply.
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Err(Error::Tracking(format!(
            "no ledger at {}; run `cherrytrack init` first",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Tracking(format!("failed to read {}: {e}", path.display())))?;

    let ledger: Ledger = toml::from_str(&content)
        .map_err(|e| Error::Tracking(format!("failed to parse {}: {e}", path.display())))?;

    debug!(path = %path.display(), items = ledger.tracked_items.len(), "loaded ledger");
    Ok(ledger)
}

/// Save the ledger to disk, creating parent directories as needed.
pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Tracking(format!("failed to create {}: {e}", dir.display())))?;
    }

    let content = toml::to_string_pretty(ledger)
        .map_err(|e| Error::Tracking(format!("failed to serialize ledger: {e}")))?;

    let content_with_header = format!(
        "# cherrytrack ledger\n# Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    fs::write(path, content_with_header)
        .map_err(|e| Error::Tracking(format!("failed to write {}: {e}", path.display())))?;

    debug!(path = %path.display(), "saved ledger");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{CherryPickRef, CiStatus, Status, TrackedItem};
    use tempfile::TempDir;

    #[test]
    fn test_ledger_path() {
        let temp = TempDir::new().unwrap();
        assert!(ledger_path(temp.path()).ends_with(".cherrytrack.toml"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = load_ledger(&ledger_path(temp.path())).unwrap_err();
        assert!(err.to_string().contains("cherrytrack init"));
    }

    #[test]
    fn test_save_creates_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("ledger.toml");
        save_ledger(&path, &Ledger::new("acme", "widgets", "main")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let temp = TempDir::new().unwrap();
        let store = FileLedgerStore::new(ledger_path(temp.path()));

        let mut ledger = Ledger::new("acme", "widgets", "main");
        ledger.ai_assistant_command = "claude".to_string();
        ledger
            .last_checked_release
            .insert("release-1.0".to_string(), "v1.0.3".to_string());
        let mut item = TrackedItem::new(123, "Fix crash", ["release-1.0", "release-1.1"]);
        let bs = item.branch_mut("release-1.0").unwrap();
        bs.mark_failed().unwrap();
        bs.mark_picked(CherryPickRef {
            number: 456,
            title: "[1.0] Fix crash (#123)".to_string(),
            ci_status: CiStatus::Failing,
        })
        .unwrap();
        ledger.track(item).unwrap();

        store.save(&ledger).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, ledger);
        let bs = loaded.branch_status(123, "release-1.0").unwrap();
        assert_eq!(bs.status, Status::Picked);
        assert_eq!(bs.ci_status(), Some(CiStatus::Failing));
        assert!(loaded.branch_status(123, "release-1.1").unwrap().cherry_pick.is_none());
        assert!(loaded.last_fetch_date.is_none());
    }

    #[test]
    fn test_file_contains_header_and_tokens() {
        let temp = TempDir::new().unwrap();
        let path = ledger_path(temp.path());
        let mut ledger = Ledger::new("acme", "widgets", "main");
        ledger
            .track(TrackedItem::new(7, "Docs", ["release-2.0"]))
            .unwrap();
        save_ledger(&path, &ledger).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# cherrytrack ledger"));
        assert!(content.contains("status = \"pending\""));
        assert!(!content.contains("cherry_pick"));
    }

    #[test]
    fn test_load_hand_written_ledger() {
        let temp = TempDir::new().unwrap();
        let path = ledger_path(temp.path());
        fs::write(
            &path,
            r#"
org = "acme"
repo = "widgets"
source_branch = "main"
ai_assistant_command = ""
last_fetch_date = "2026-01-02T03:04:05Z"

[last_checked_release]
"release-1.0" = "v1.0.0"

[[tracked_items]]
number = 42
title = "Answer"

[tracked_items.branches."release-1.0"]
status = "merged"

[tracked_items.branches."release-1.0".cherry_pick]
number = 43
title = "[1.0] Answer (#42)"
ci_status = "green"
"#,
        )
        .unwrap();

        let ledger = load_ledger(&path).unwrap();
        assert!(ledger.last_fetch_date.is_some());
        let bs = ledger.branch_status(42, "release-1.0").unwrap();
        assert_eq!(bs.status, Status::Merged);
        assert_eq!(bs.ci_status(), Some(CiStatus::Unknown));
    }
}
