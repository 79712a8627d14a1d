//! CLI progress callback with styled output

use crate::cli::style::{Stream, Stylize, arrow, check, cross, hyperlink_url};
use anstream::{eprintln, println};
use async_trait::async_trait;
use cherrytrack::error::Error;
use cherrytrack::progress::ProgressCallback;
use cherrytrack::types::PullRequest;

/// CLI progress callback that prints one line per pair event
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_pair_started(&self, operation: &str, number: u64, branch: &str) {
        println!(
            "{} {} {} on {}",
            arrow(),
            operation.emphasis(),
            format!("#{number}").accent(),
            branch.accent()
        );
    }

    async fn on_pair_succeeded(&self, operation: &str, number: u64, branch: &str) {
        println!(
            "  {} {operation} #{number} on {branch}",
            check(),
        );
    }

    async fn on_pair_failed(&self, operation: &str, number: u64, branch: &str, error: &Error) {
        eprintln!(
            "  {} {operation} #{number} on {branch}: {}",
            cross(),
            error.to_string().error()
        );
    }

    async fn on_pr_created(&self, branch: &str, pr: &PullRequest) {
        println!(
            "  Created PR {} for {} ({})",
            format!("#{}", pr.number).accent(),
            branch.accent(),
            hyperlink_url(Stream::Stdout, &pr.html_url)
        );
    }

    async fn on_message(&self, message: &str) {
        println!("  {}", message.muted());
    }
}
