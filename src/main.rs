//! cherrytrack - backport bookkeeping for release branches
//!
//! CLI binary for picking, merging and following cherry-pick PRs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cherrytrack::bulk::BulkOperation;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "cherrytrack")]
#[command(about = "Track and complete cherry-picks of merged PRs onto release branches")]
#[command(version)]
struct Cli {
    /// Path to the git repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Ledger file (defaults to .cherrytrack.toml in the repository root)
    #[arg(long, global = true, env = "CHERRYTRACK_LEDGER")]
    ledger: Option<PathBuf>,

    /// Git remote to fetch from and push to
    #[arg(long, global = true, default_value = "origin")]
    remote: String,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger for this repository
    Init {
        /// GitHub organization or user
        #[arg(long)]
        org: String,

        /// Repository name
        #[arg(long)]
        repo: String,

        /// Branch the original PRs merge into
        #[arg(long, default_value = "main")]
        source_branch: String,

        /// Command launching the conflict assistant
        #[arg(long)]
        assistant: Option<String>,
    },

    /// Change ledger settings
    Config {
        /// Command launching the conflict assistant (empty to unset)
        #[arg(long)]
        assistant: String,
    },

    /// Start tracking a merged PR for one or more target branches
    Track {
        /// Original PR number
        number: u64,

        /// Original PR title
        #[arg(long)]
        title: String,

        /// Target branch (repeatable)
        #[arg(long = "branch", required = true)]
        branches: Vec<String>,
    },

    /// Record that the automated cherry-pick failed on a branch
    MarkFailed {
        /// Original PR number
        number: u64,

        /// Target branch
        #[arg(long)]
        branch: String,
    },

    /// Cherry-pick a PR onto its failed branches and open cherry-pick PRs
    Pick {
        /// Original PR number
        number: u64,

        /// Only this target branch
        #[arg(long)]
        branch: Option<String>,
    },

    /// Squash-merge cherry-pick PRs whose CI is passing
    Merge {
        /// Only this original PR
        number: Option<u64>,

        /// Only this target branch (requires a PR number)
        #[arg(long, requires = "number")]
        branch: Option<String>,

        /// Show what would be merged without merging
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Re-run failed CI of cherry-pick PRs whose CI is failing
    Retry {
        /// Only this original PR
        number: Option<u64>,

        /// Only this target branch (requires a PR number)
        #[arg(long, requires = "number")]
        branch: Option<String>,

        /// Show what would be retried without retrying
        #[arg(long)]
        dry_run: bool,
    },

    /// Refresh CI state of open cherry-pick PRs
    RefreshCi {
        /// Only this original PR
        number: Option<u64>,
    },

    /// Promote merged cherry-picks contained in new release tags
    CheckReleases,

    /// Show tracked PRs and their status per branch
    Status,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cherrytrack=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = cli::GlobalOptions {
        path: cli.path.unwrap_or_else(|| PathBuf::from(".")),
        ledger: cli.ledger,
        remote: cli.remote,
    };

    match cli.command {
        Commands::Init {
            org,
            repo,
            source_branch,
            assistant,
        } => {
            cli::run_init(&opts, &org, &repo, &source_branch, assistant.as_deref())?;
        }
        Commands::Config { assistant } => {
            cli::run_config(&opts, &assistant)?;
        }
        Commands::Track {
            number,
            title,
            branches,
        } => {
            cli::run_track(&opts, number, &title, &branches)?;
        }
        Commands::MarkFailed { number, branch } => {
            cli::run_mark_failed(&opts, number, &branch)?;
        }
        Commands::Status => {
            cli::run_status(&opts)?;
        }
        Commands::Pick { number, branch } => {
            cli::run_pick(&opts, number, branch.as_deref()).await?;
        }
        Commands::Merge {
            number,
            branch,
            dry_run,
            yes,
        } => {
            let options = cli::BulkOptions {
                dry_run,
                confirm: !yes,
            };
            cli::run_bulk(&opts, BulkOperation::Merge, number, branch.as_deref(), options)
                .await?;
        }
        Commands::Retry {
            number,
            branch,
            dry_run,
        } => {
            let options = cli::BulkOptions {
                dry_run,
                confirm: false,
            };
            cli::run_bulk(&opts, BulkOperation::Retry, number, branch.as_deref(), options)
                .await?;
        }
        Commands::RefreshCi { number } => {
            cli::run_refresh(&opts, number).await?;
        }
        Commands::CheckReleases => {
            cli::run_check_releases(&opts)?;
        }
    }

    Ok(())
}
