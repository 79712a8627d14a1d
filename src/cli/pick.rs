//! Pick command - redo a failed cherry-pick by hand

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::{Stream, Stylize, check, hyperlink_url};
use anstream::println;
use cherrytrack::cherry_pick::{execute_pick, plan_pick};
use cherrytrack::error::Result;

/// Run the pick command
#[allow(clippy::future_not_send)]
pub async fn run_pick(opts: &GlobalOptions, number: u64, branch: Option<&str>) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    // Reject bad requests before credentials are needed
    plan_pick(&ctx.ledger, number, branch)?;
    let platform = ctx.platform().await?;

    let result = execute_pick(
        &mut ctx.ledger,
        &ctx.store,
        &ctx.repo,
        platform.as_ref(),
        number,
        branch,
        &CliProgress,
    )
    .await?;

    println!();
    println!(
        "{} Picked {} onto {} branch(es)",
        check(),
        format!("#{number}").accent(),
        result.picked.len().accent()
    );
    for picked in &result.picked {
        println!(
            "  {}: {} {}",
            picked.branch,
            format!("#{}", picked.pr.number).accent(),
            hyperlink_url(Stream::Stdout, &picked.pr.html_url).muted()
        );
    }
    Ok(())
}
