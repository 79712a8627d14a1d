//! Real git repositories in temp directories
//!
//! Layout: `<tmp>/remote.git` (bare, the `origin` remote) and `<tmp>/work`
//! (clone with `main` and `release-1.0`, both pushed).

use cherrytrack::repo::GitRepo;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Base content of `app.txt` on both branches
pub const APP_FILE: &str = "app.txt";
const APP_CONTENT: &str = "line one\nline two\nline three\n";

/// A work tree with an `origin` remote, deleted on drop
pub struct TempGitRepo {
    dir: TempDir,
    work: PathBuf,
    remote: PathBuf,
}

impl TempGitRepo {
    /// Create the remote and work tree with `main` and `release-1.0`
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let remote = dir.path().join("remote.git");
        let work = dir.path().join("work");
        fs::create_dir_all(&work).expect("failed to create work dir");

        git(dir.path(), &["init", "--bare", "--initial-branch=main", "remote.git"]);
        git(&work, &["init", "--initial-branch=main"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(&work, &["config", "tag.gpgsign", "false"]);
        git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

        let repo = Self { dir, work, remote };
        repo.write(APP_FILE, APP_CONTENT);
        repo.commit_all("Initial commit");
        git(&repo.work, &["branch", "release-1.0"]);
        repo.push("main");
        repo.push("release-1.0");
        repo
    }

    /// Work tree root
    pub fn path(&self) -> &Path {
        &self.work
    }

    /// Bare remote path
    pub fn remote_path(&self) -> &Path {
        &self.remote
    }

    /// Directory outside the work tree for scripts and ledgers
    pub fn scratch_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Adapter bound to `origin`
    pub fn repo(&self) -> GitRepo {
        GitRepo::open(&self.work, "origin").expect("failed to open repo")
    }

    /// Write a file in the work tree
    pub fn write(&self, path: &str, content: &str) {
        fs::write(self.work.join(path), content).expect("failed to write file");
    }

    /// Read a file from the work tree
    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.work.join(path)).expect("failed to read file")
    }

    /// Check out a local branch
    pub fn checkout(&self, branch: &str) {
        git(&self.work, &["checkout", "--quiet", branch]);
    }

    /// Stage everything and commit; returns the new HEAD sha
    pub fn commit_all(&self, message: &str) -> String {
        git(&self.work, &["add", "--all"]);
        git(&self.work, &["commit", "--quiet", "-m", message]);
        self.head()
    }

    /// On `branch`, write `path` and commit it; returns the sha
    pub fn commit_file(&self, branch: &str, path: &str, content: &str, message: &str) -> String {
        self.checkout(branch);
        self.write(path, content);
        let sha = self.commit_all(message);
        self.push(branch);
        sha
    }

    /// HEAD sha
    pub fn head(&self) -> String {
        git(&self.work, &["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Full message of a commit
    pub fn message(&self, rev: &str) -> String {
        git(&self.work, &["log", "-1", "--format=%B", rev])
    }

    /// Push a branch to origin
    pub fn push(&self, branch: &str) {
        git(&self.work, &["push", "--quiet", "origin", branch]);
    }

    /// Tag a commit and push the tag
    pub fn tag(&self, name: &str, rev: &str) {
        git(&self.work, &["tag", name, rev]);
        git(&self.work, &["push", "--quiet", "origin", name]);
    }

    /// Whether the bare remote has a branch
    pub fn remote_has_branch(&self, branch: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .current_dir(&self.remote)
            .status()
            .expect("failed to run git")
            .success()
    }
}

/// Run git in `dir`, panicking on failure; returns stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}
