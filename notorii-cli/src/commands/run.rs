//! `notorii run`: one reconciliation pass.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use notorii_core::config;
use notorii_daemon::run_once;
use notorii_sync::{Outcome, RunOptions, RunReport};

use super::plan::duplicate_lines;

/// Arguments for `notorii run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Plan and report every action without writing to either catalog.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the full report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RunJson<'a> {
    dry_run: bool,
    applied: usize,
    failed: usize,
    report: &'a RunReport,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let report = run_once(
            &home,
            RunOptions {
                dry_run: self.dry_run,
            },
        )
        .context("reconciliation pass failed")?;

        if self.json {
            let payload = RunJson {
                dry_run: self.dry_run,
                applied: report.applied_count(),
                failed: report.failed_count(),
                report: &report,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize run report")?
            );
        } else {
            print_summary(&report, self.dry_run);
        }

        let failed = report.failed_count();
        if failed > 0 {
            bail!("{failed} action(s) failed");
        }
        Ok(())
    }
}

fn print_summary(report: &RunReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}notion: {} app(s) | torii: {} app(s)",
        report.notion_count, report.torii_count
    );
    for line in duplicate_lines(report) {
        println!("{prefix}! {line}");
    }

    if report.dispatched.is_empty() {
        println!("{prefix}✓ catalogs already in step, nothing to do");
        return;
    }

    println!(
        "{prefix}✓ {} applied, {} failed",
        report.applied_count(),
        report.failed_count()
    );
    for record in &report.dispatched {
        println!("  {}", dispatch_line(record.phase.to_string(), &record.key.0, &record.outcome));
    }
}

fn dispatch_line(phase: String, key: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied { id: Some(id) } => format!("✎  {phase:<16} {key} ({id})"),
        Outcome::Applied { id: None } => format!("✎  {phase:<16} {key}"),
        Outcome::WouldApply => format!("~  {phase:<16} {key}"),
        Outcome::Failed { error } => format!("✗  {phase:<16} {key}: {error}"),
    }
}
