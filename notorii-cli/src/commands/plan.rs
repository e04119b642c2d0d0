//! `notorii plan`: dry-run pass rendered as a table.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use notorii_core::{config, NormalizedRecord};
use notorii_daemon::run_once;
use notorii_sync::{ReconcilePlan, RunOptions, RunReport, UpdateAction};

/// Arguments for `notorii plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Emit the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled, Debug, PartialEq, Eq)]
struct PlanRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "app")]
    app: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let report = run_once(&home, RunOptions { dry_run: true })
            .context("could not plan reconciliation")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report.plan).context("failed to serialize plan")?
            );
            return Ok(());
        }

        println!(
            "notorii v{} | notion: {} | torii: {} | {} action(s)",
            env!("CARGO_PKG_VERSION"),
            report.notion_count,
            report.torii_count,
            report.plan.action_count(),
        );
        print_table(&report.plan);
        for line in duplicate_lines(&report) {
            println!("{} {line}", "■".yellow().bold());
        }
        Ok(())
    }
}

fn print_table(plan: &ReconcilePlan) {
    if plan.is_empty() {
        println!("{} nothing to do", "■".green().bold());
    } else {
        let mut table = Table::new(plan_rows(plan));
        table.with(Style::rounded());
        println!("{table}");
    }

    if !plan.suppressed.is_empty() {
        let names: Vec<&str> = plan.suppressed.iter().map(|k| k.as_str()).collect();
        println!(
            "{} {} newer but identical, skipped: {}",
            "■".bright_black().bold(),
            plan.suppressed.len(),
            names.join(", ")
        );
    }
}

/// One line per side that had repeated app names.
pub fn duplicate_lines(report: &RunReport) -> Vec<String> {
    [
        ("notion", &report.notion_duplicates),
        ("torii", &report.torii_duplicates),
    ]
    .into_iter()
    .filter(|(_, keys)| !keys.is_empty())
    .map(|(side, keys)| {
        let names: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        format!("duplicate {side} name(s), last one used: {}", names.join(", "))
    })
    .collect()
}

fn plan_rows(plan: &ReconcilePlan) -> Vec<PlanRow> {
    let mut rows = create_rows("torii", &plan.missing_in_torii);
    rows.extend(update_rows(&plan.update_torii));
    rows.extend(create_rows("notion", &plan.missing_in_notion));
    rows.extend(update_rows(&plan.update_notion));
    rows
}

fn create_rows(target: &str, records: &[NormalizedRecord]) -> Vec<PlanRow> {
    records
        .iter()
        .map(|r| PlanRow {
            action: "create".green().bold().to_string(),
            target: target.to_string(),
            app: r.key.to_string(),
            detail: format!("{} ({})", r.fields.url, r.fields.state),
        })
        .collect()
}

fn update_rows(actions: &[UpdateAction]) -> Vec<PlanRow> {
    actions
        .iter()
        .map(|a| PlanRow {
            action: "update".yellow().bold().to_string(),
            target: a.target.to_string(),
            app: a.key.to_string(),
            detail: a.patch.changed_fields().join(", "),
        })
        .collect()
}
