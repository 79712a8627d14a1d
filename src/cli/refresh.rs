//! Refresh-ci command

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::{Stylize, check};
use anstream::println;
use cherrytrack::bulk::refresh_ci_status;
use cherrytrack::error::Result;

/// Run the refresh-ci command
#[allow(clippy::future_not_send)]
pub async fn run_refresh(opts: &GlobalOptions, number: Option<u64>) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    if let Some(number) = number {
        ctx.ledger.item(number)?;
    }
    let platform = ctx.platform().await?;

    let report = refresh_ci_status(
        &mut ctx.ledger,
        &ctx.store,
        platform.as_ref(),
        number,
        &CliProgress,
    )
    .await?;

    if report.checked == 0 {
        println!("{}", "No open cherry-pick PRs to check.".muted());
        return Ok(());
    }
    for (number, branch, ci) in &report.changed {
        println!("  #{number} on {branch}: CI {}", ci.accent());
    }
    println!(
        "{} Checked {} PR(s), {} changed, {} error(s)",
        check(),
        report.checked.accent(),
        report.changed.len(),
        report.failures.len()
    );
    Ok(())
}
