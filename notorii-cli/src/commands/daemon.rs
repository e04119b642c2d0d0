//! `notorii daemon`: scheduled reconciliation in the foreground.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use notorii_core::config;
use notorii_daemon::start_blocking;
use notorii_sync::RunOptions;

#[derive(Args, Debug)]
pub struct DaemonArgs {
    /// Seconds between passes. Defaults to `schedule.interval_secs`.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Plan every pass without writing.
    #[arg(long)]
    pub dry_run: bool,
}

impl DaemonArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let secs = match self.interval {
            Some(secs) => secs,
            None => {
                config::load_effective_at(&home)
                    .context("failed to load config")?
                    .schedule
                    .interval_secs
            }
        };

        let stats = start_blocking(
            &home,
            Duration::from_secs(secs.max(1)),
            RunOptions {
                dry_run: self.dry_run,
            },
        )
        .context("daemon exited with error")?;
        println!(
            "stopped after {} pass(es) ({} failed, {} with failed actions)",
            stats.passes, stats.failed_passes, stats.partial_passes
        );
        Ok(())
    }
}
