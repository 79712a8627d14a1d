//! Check-releases command

use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::{Stylize, check, spinner_style};
use anstream::println;
use cherrytrack::error::Result;
use cherrytrack::release::check_releases;
use indicatif::ProgressBar;
use std::time::Duration;

/// Run the check-releases command
pub fn run_check_releases(opts: &GlobalOptions) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Checking release tags on {}...", ctx.repo.remote()));
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = check_releases(&mut ctx.ledger, &ctx.store, &ctx.repo);
    spinner.finish_and_clear();
    let report = result?;

    if report.new_tags.is_empty() {
        println!("{}", "No new release tags.".muted());
        return Ok(());
    }
    for (branch, tag) in &report.new_tags {
        println!("  {branch}: {}", tag.accent());
    }
    for (number, branch) in &report.released {
        println!(
            "{} {} released on {}",
            check(),
            format!("#{number}").accent(),
            branch.accent()
        );
    }
    Ok(())
}
