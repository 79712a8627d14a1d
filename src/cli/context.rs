//! Shared command context for CLI commands
//!
//! Extracts the setup shared by every command that reads the ledger.

use cherrytrack::error::Result;
use cherrytrack::platform::{PlatformService, create_platform_service};
use cherrytrack::repo::GitRepo;
use cherrytrack::tracking::{FileLedgerStore, Ledger, ledger_path};
use cherrytrack::types::PlatformConfig;
use std::path::{Path, PathBuf};

/// Options every command accepts
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Path inside the git repository
    pub path: PathBuf,
    /// Explicit ledger file, overriding the default location
    pub ledger: Option<PathBuf>,
    /// Remote name
    pub remote: String,
}

impl GlobalOptions {
    /// Open the repository these options point at
    pub fn open_repo(&self) -> Result<GitRepo> {
        GitRepo::open(&self.path, &self.remote)
    }

    /// Ledger file for `repo`
    pub fn ledger_path(&self, repo: &GitRepo) -> PathBuf {
        self.ledger
            .clone()
            .unwrap_or_else(|| ledger_path(repo.root()))
    }
}

/// Shared context for commands that work on an existing ledger
///
/// The platform service is built on demand: ledger-only commands must not
/// require GitHub credentials.
pub struct CommandContext {
    /// The git working tree
    pub repo: GitRepo,
    /// Where the ledger is persisted
    pub store: FileLedgerStore,
    /// The loaded ledger
    pub ledger: Ledger,
}

impl CommandContext {
    /// Open the repository and load its ledger
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let repo = opts.open_repo()?;
        let store = FileLedgerStore::new(opts.ledger_path(&repo));
        let ledger = store.load()?;

        Ok(Self {
            repo,
            store,
            ledger,
        })
    }

    /// Ledger file in use
    pub fn ledger_file(&self) -> &Path {
        self.store.path()
    }

    /// Authenticated platform service for the ledger's repository
    ///
    /// `GH_HOST` selects a GitHub Enterprise host.
    pub async fn platform(&self) -> Result<Box<dyn PlatformService>> {
        let config = PlatformConfig {
            owner: self.ledger.org.clone(),
            repo: self.ledger.repo.clone(),
            host: std::env::var("GH_HOST").ok().filter(|h| !h.is_empty()),
        };
        create_platform_service(&config).await
    }
}
