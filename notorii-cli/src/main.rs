//! notorii: keep a Notion app database and a Torii app catalog in step.
//!
//! # Usage
//!
//! ```text
//! notorii run [--dry-run] [--json]
//! notorii plan [--json]
//! notorii daemon [--interval SECS] [--dry-run]
//! notorii config init [--force]
//! notorii config show
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, daemon::DaemonArgs, plan::PlanArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(
    name = "notorii",
    version,
    about = "Reconcile application records between Notion and Torii",
    long_about = None,
)]
struct Cli {
    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass.
    Run(RunArgs),

    /// Show what a pass would do without writing anything.
    Plan(PlanArgs),

    /// Run a pass on a fixed interval until interrupted.
    Daemon(DaemonArgs),

    /// Manage ~/.notorii/config.yaml.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    notorii_daemon::init_tracing(cli.log_json);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Daemon(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
