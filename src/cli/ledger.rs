//! Ledger commands - init, config, track, mark-failed, status

use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::{Stylize, check};
use anstream::println;
use chrono::Utc;
use cherrytrack::error::{Error, Result};
use cherrytrack::tracking::{FileLedgerStore, Ledger, LedgerStore, Status, TrackedItem};

/// Create a ledger for the repository
pub fn run_init(
    opts: &GlobalOptions,
    org: &str,
    repo_name: &str,
    source_branch: &str,
    assistant: Option<&str>,
) -> Result<()> {
    let repo = opts.open_repo()?;
    let path = opts.ledger_path(&repo);
    if path.exists() {
        return Err(Error::Tracking(format!(
            "ledger already exists at {}",
            path.display()
        )));
    }

    let mut ledger = Ledger::new(org, repo_name, source_branch);
    if let Some(cmd) = assistant {
        ledger.ai_assistant_command = cmd.trim().to_string();
    }
    FileLedgerStore::new(&path).save(&ledger)?;

    println!(
        "{} Initialized ledger for {} at {}",
        check(),
        format!("{org}/{repo_name}").accent(),
        path.display().muted()
    );
    Ok(())
}

/// Update ledger settings
pub fn run_config(opts: &GlobalOptions, assistant: &str) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.ledger.ai_assistant_command = assistant.trim().to_string();
    ctx.store.save(&ctx.ledger)?;

    match ctx.ledger.assistant_command() {
        Some(cmd) => println!("{} Assistant set to {}", check(), cmd.accent()),
        None => println!("{} Assistant unset", check()),
    }
    Ok(())
}

/// Track a PR for target branches
pub fn run_track(opts: &GlobalOptions, number: u64, title: &str, branches: &[String]) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.ledger.track(TrackedItem::new(number, title, branches))?;
    ctx.ledger.last_fetch_date = Some(Utc::now());
    ctx.store.save(&ctx.ledger)?;

    println!(
        "{} Tracking {} on {}",
        check(),
        format!("#{number}").accent(),
        branches.join(", ").accent()
    );
    Ok(())
}

/// Record a failed automated cherry-pick
pub fn run_mark_failed(opts: &GlobalOptions, number: u64, branch: &str) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.ledger.mark_failed(number, branch)?;
    ctx.store.save(&ctx.ledger)?;

    println!(
        "{} {} on {} marked failed",
        check(),
        format!("#{number}").accent(),
        branch.accent()
    );
    Ok(())
}

/// Print every tracked PR with its per-branch status
pub fn run_status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let ledger = &ctx.ledger;

    println!(
        "{} {}",
        format!("{}/{}", ledger.org, ledger.repo).emphasis(),
        ctx.ledger_file().display().muted()
    );
    if let Some(date) = ledger.last_fetch_date {
        println!(
            "{}",
            format!("Last tracked {}", date.format("%Y-%m-%d %H:%M UTC")).muted()
        );
    }
    if ledger.tracked_items.is_empty() {
        println!("{}", "No PRs tracked.".muted());
        return Ok(());
    }

    for item in &ledger.tracked_items {
        println!("{} {}", format!("#{}", item.number).accent(), item.title);
        for branch in item.sorted_branches() {
            let Ok(status) = item.branch(branch) else {
                continue;
            };
            let label = status.status.to_string();
            let label = match status.status {
                Status::Failed => label.warn().for_stdout().to_string(),
                Status::Merged | Status::Released => label.success().to_string(),
                Status::Pending | Status::Picked => label.muted().to_string(),
            };
            match &status.cherry_pick {
                Some(cp) => println!(
                    "  {branch}: {label} (#{}, CI {})",
                    cp.number, cp.ci_status
                ),
                None => println!("  {branch}: {label}"),
            }
        }
    }
    Ok(())
}
