//! Handoff to an interactive conflict-resolution assistant.
//!
//! The assistant runs as a blocking child process on the controlling
//! terminal. Its session is opaque: we only look at the working tree after it
//! exits.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// What the assistant is told when the session opens
#[derive(Debug, Clone)]
pub struct ConflictContext {
    /// Human-readable description of the commit being picked
    pub commit_description: String,
    /// Target branch of the pick
    pub branch: String,
    /// Paths with conflicts
    pub conflicted_files: Vec<String>,
}

impl ConflictContext {
    /// Initial prompt handed to the assistant
    pub fn message(&self) -> String {
        let mut msg = format!(
            "I'm cherry-picking commit {} onto branch {} and hit {} conflicted file(s):\n",
            self.commit_description,
            self.branch,
            self.conflicted_files.len()
        );
        for file in &self.conflicted_files {
            msg.push_str("- ");
            msg.push_str(file);
            msg.push('\n');
        }
        msg.push_str(
            "\nPlease resolve the conflicts in these files, removing every conflict marker. \
             Staging the files and running `git cherry-pick --continue` is optional.",
        );
        msg
    }
}

/// A resolved assistant executable plus its configured arguments
#[derive(Debug, Clone)]
pub struct Assistant {
    program: PathBuf,
    args: Vec<String>,
}

impl Assistant {
    /// Resolve the configured command; `None` means nothing is configured
    ///
    /// The first word is looked up on `PATH` (or used directly when it is a
    /// path); remaining words are passed as leading arguments.
    pub fn from_command(command: Option<&str>) -> Result<Self> {
        let mut words = command
            .unwrap_or_default()
            .split_whitespace()
            .map(ToString::to_string);
        let Some(name) = words.next() else {
            return Err(Error::AssistantNotConfigured);
        };

        let program = which::which(&name).map_err(|_| Error::AssistantNotFound(name.clone()))?;
        debug!(program = %program.display(), "resolved assistant");

        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Resolved executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run one interactive session in `workdir`, blocking until it exits
    ///
    /// The context message is passed as the final argument. A non-zero exit
    /// is logged, not treated as failure: the working tree decides.
    pub fn launch(&self, workdir: &Path, context: &ConflictContext) -> Result<()> {
        info!(
            program = %self.program.display(),
            files = context.conflicted_files.len(),
            "starting assistant session"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(context.message())
            .current_dir(workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if status.success() {
            debug!("assistant session ended");
        } else {
            warn!(%status, "assistant session exited unsuccessfully");
        }
        Ok(())
    }
}
