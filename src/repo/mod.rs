//! Git working-tree operations
//!
//! Every call is a blocking `git` subprocess run in the repository root.
//! The working tree is single-owner: callers run one operation at a time.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use tracing::debug;

/// Exit status git uses when a cherry-pick stops on conflicts
const CONFLICT_EXIT_CODE: i32 = 1;

/// Line prefixes git writes into conflicted files
const CONFLICT_MARKERS: &[&str] = &["<<<<<<< ", ">>>>>>> "];

/// Outcome of `git cherry-pick`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CherryPickAttempt {
    /// Applied and committed
    Clean,
    /// Stopped with conflicts; the cherry-pick is in progress
    Conflicted,
    /// Any other failure, with git's explanation
    Failed(String),
}

/// A git working tree bound to one remote
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
    remote: String,
}

struct GitOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl From<Output> for GitOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

impl GitRepo {
    /// Open the working tree containing `path`
    pub fn open(path: &Path, remote: &str) -> Result<Self> {
        let output: GitOutput = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()?
            .into();

        if !output.status.success() {
            return Err(Error::Git {
                command: "rev-parse --show-toplevel".to_string(),
                stderr: output.stderr,
            });
        }

        Ok(Self {
            root: PathBuf::from(output.stdout.trim()),
            remote: remote.to_string(),
        })
    }

    /// Repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remote name used for fetch and push
    pub fn remote(&self) -> &str {
        &self.remote
    }

    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        debug!(args = ?args, "git");
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?
            .into())
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(Error::Git {
                command: args.join(" "),
                stderr: output.stderr,
            })
        }
    }

    /// Refresh remote-tracking refs
    pub fn fetch(&self) -> Result<()> {
        self.run_checked(&["fetch", "--prune", &self.remote])?;
        Ok(())
    }

    /// Check out `branch`, reset to match the remote's copy
    ///
    /// Local divergence on that branch is discarded.
    pub fn checkout_remote_branch(&self, branch: &str) -> Result<()> {
        let upstream = format!("{}/{branch}", self.remote);
        self.run_checked(&["checkout", "--force", "-B", branch, &upstream])?;
        Ok(())
    }

    /// Whether a local branch exists
    pub fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        let refname = format!("refs/heads/{branch}");
        Ok(self
            .run(&["rev-parse", "--verify", "--quiet", &refname])?
            .status
            .success())
    }

    /// Whether the remote has a branch
    pub fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        let output = self.run(&["ls-remote", "--exit-code", "--heads", &self.remote, branch])?;
        match output.status.code() {
            Some(0) => Ok(true),
            // --exit-code: 2 means no matching refs
            Some(2) => Ok(false),
            _ => Err(Error::Git {
                command: format!("ls-remote --heads {} {branch}", self.remote),
                stderr: output.stderr,
            }),
        }
    }

    /// Delete a local branch; absent is fine
    pub fn delete_local_branch(&self, branch: &str) -> Result<()> {
        if self.local_branch_exists(branch)? {
            self.run_checked(&["branch", "-D", branch])?;
        }
        Ok(())
    }

    /// Delete a branch on the remote; absent is fine
    pub fn delete_remote_branch(&self, branch: &str) -> Result<()> {
        if self.remote_branch_exists(branch)? {
            self.run_checked(&["push", &self.remote, "--delete", branch])?;
        }
        Ok(())
    }

    /// Create and check out a branch at HEAD
    pub fn create_branch(&self, branch: &str) -> Result<()> {
        self.run_checked(&["checkout", "-b", branch])?;
        Ok(())
    }

    /// Cherry-pick `commit` with provenance trailer and sign-off
    pub fn cherry_pick(&self, commit: &str) -> Result<CherryPickAttempt> {
        let output = self.run(&["cherry-pick", "-x", "--signoff", commit])?;
        if output.status.success() {
            return Ok(CherryPickAttempt::Clean);
        }

        // Exit 1 is also used for "local changes would be overwritten" and
        // similar refusals; only count it as a conflict when git left a
        // cherry-pick in progress.
        if output.status.code() == Some(CONFLICT_EXIT_CODE) && self.cherry_pick_in_progress()? {
            return Ok(CherryPickAttempt::Conflicted);
        }

        let reason = if output.stderr.is_empty() {
            format!("git exited with {}", output.status)
        } else {
            output.stderr
        };
        Ok(CherryPickAttempt::Failed(reason))
    }

    /// Whether a cherry-pick is stopped mid-way (`CHERRY_PICK_HEAD` exists)
    pub fn cherry_pick_in_progress(&self) -> Result<bool> {
        Ok(self
            .run(&["rev-parse", "--verify", "--quiet", "CHERRY_PICK_HEAD"])?
            .status
            .success())
    }

    /// Paths with unmerged index entries
    pub fn conflicted_files(&self) -> Result<Vec<String>> {
        let stdout = self.run_checked(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// Subset of `paths` whose contents still carry conflict markers
    pub fn files_with_conflict_markers(&self, paths: &[String]) -> Result<Vec<String>> {
        let mut remaining = Vec::new();
        for path in paths {
            let full = self.root.join(path);
            // Deleting the file is a valid resolution
            let Ok(bytes) = std::fs::read(&full) else {
                continue;
            };
            let content = String::from_utf8_lossy(&bytes);
            if has_conflict_markers(&content) {
                remaining.push(path.clone());
            }
        }
        Ok(remaining)
    }

    /// Stage resolutions, including deletions
    pub fn stage(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--all", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_checked(&args)?;
        Ok(())
    }

    /// Commit the in-progress cherry-pick with its prepared message
    pub fn cherry_pick_continue(&self) -> Result<()> {
        self.run_checked(&["-c", "core.editor=true", "cherry-pick", "--continue"])?;
        Ok(())
    }

    /// One-line description of a commit (`<short sha> <subject>`)
    pub fn describe_commit(&self, commit: &str) -> Result<String> {
        let stdout = self.run_checked(&["log", "-1", "--format=%h %s", commit])?;
        Ok(stdout.trim().to_string())
    }

    /// Full message of HEAD
    pub fn head_message(&self) -> Result<String> {
        self.run_checked(&["log", "-1", "--format=%B", "HEAD"])
    }

    /// Replace HEAD's message verbatim
    pub fn amend_message(&self, message: &str) -> Result<()> {
        let args = ["commit", "--amend", "--no-verify", "--cleanup=verbatim", "-F", "-"];
        debug!(args = ?args, "git");
        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes())?;
        }

        let output: GitOutput = child.wait_with_output()?.into();
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Git {
                command: args.join(" "),
                stderr: output.stderr,
            })
        }
    }

    /// Push a branch to the remote, setting upstream
    pub fn push(&self, branch: &str) -> Result<()> {
        self.run_checked(&["push", "--set-upstream", &self.remote, branch])?;
        Ok(())
    }

    /// Newest tag reachable from the remote's copy of `branch`
    pub fn latest_tag(&self, branch: &str) -> Result<Option<String>> {
        let upstream = format!("{}/{branch}", self.remote);
        let output = self.run(&["describe", "--tags", "--abbrev=0", &upstream])?;
        if output.status.success() {
            let tag = output.stdout.trim();
            return Ok((!tag.is_empty()).then(|| tag.to_string()));
        }
        if output.stderr.contains("No names found") || output.stderr.contains("No tags can describe")
        {
            return Ok(None);
        }
        Err(Error::Git {
            command: format!("describe --tags --abbrev=0 {upstream}"),
            stderr: output.stderr,
        })
    }

    /// Subjects of every commit reachable from `rev`
    pub fn commit_subjects(&self, rev: &str) -> Result<Vec<String>> {
        let stdout = self.run_checked(&["log", "--format=%s", rev])?;
        Ok(stdout.lines().map(ToString::to_string).collect())
    }
}

/// Whether text contains a line starting with a conflict marker
pub fn has_conflict_markers(content: &str) -> bool {
    content
        .lines()
        .any(|line| CONFLICT_MARKERS.iter().any(|m| line.starts_with(m)))
}
