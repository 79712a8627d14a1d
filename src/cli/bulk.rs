//! Merge and retry commands - fan an operation out over eligible pairs

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::{Stylize, arrow, check};
use anstream::{eprintln, println};
use cherrytrack::bulk::{
    BulkOperation, BulkOutcome, BulkPlan, BulkReport, BulkScope, execute_bulk, plan_bulk,
};
use cherrytrack::error::{Error, Result};
use dialoguer::Confirm;

/// Options for bulk commands
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkOptions {
    /// Show the plan without executing it
    pub dry_run: bool,
    /// Preview the plan and prompt before executing
    pub confirm: bool,
}

/// Run a bulk command
#[allow(clippy::future_not_send)]
pub async fn run_bulk(
    opts: &GlobalOptions,
    operation: BulkOperation,
    number: Option<u64>,
    branch: Option<&str>,
    options: BulkOptions,
) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    let scope = BulkScope::from_args(number, branch);

    // Planning validates the request before credentials are needed
    let plan = plan_bulk(&ctx.ledger, operation, &scope)?;

    if options.dry_run {
        report_dry_run(&plan);
        return Ok(());
    }

    if plan.is_empty() {
        println!("{}", format!("No pull requests eligible to {operation}.").muted());
        return Ok(());
    }

    if options.confirm {
        report_dry_run(&plan);
        if !Confirm::new()
            .with_prompt(format!("Proceed with {operation}?"))
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    let platform = ctx.platform().await?;
    let report = execute_bulk(
        &mut ctx.ledger,
        &ctx.store,
        platform.as_ref(),
        operation,
        &scope,
        &CliProgress,
    )
    .await?;

    print_report(&report)
}

fn report_dry_run(plan: &BulkPlan) {
    if plan.is_empty() {
        println!(
            "{}",
            format!("No pull requests eligible to {}.", plan.operation).muted()
        );
        return;
    }
    println!(
        "{} {}",
        format!("Would {}", plan.operation).emphasis(),
        format!("{} pair(s):", plan.len()).accent()
    );
    for step in &plan.steps {
        println!("  {} {step}", arrow());
    }
}

fn print_report(report: &BulkReport) -> Result<()> {
    println!();
    for failure in &report.failures {
        eprintln!(
            "  {} #{} on {}: {}",
            "failed".error(),
            failure.number,
            failure.branch,
            failure.error
        );
    }

    match report.outcome() {
        BulkOutcome::NothingEligible => {
            println!(
                "{}",
                format!("No pull requests eligible to {}.", report.operation).muted()
            );
            Ok(())
        }
        BulkOutcome::AllFailed => Err(Error::Platform(format!(
            "all {} {} attempt(s) failed",
            report.eligible, report.operation
        ))),
        BulkOutcome::Completed => {
            println!(
                "{} {}: {} processed, {} error(s)",
                check(),
                report.operation.to_string().emphasis(),
                report.processed().accent(),
                report.errors()
            );
            Ok(())
        }
    }
}
