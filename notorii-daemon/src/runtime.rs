use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

use notorii_sync::{RunOptions, RunReport};

use crate::error::{io_err, DaemonError};
use crate::pass;

/// Counters for a finished schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub passes: usize,
    /// Passes that aborted before dispatching anything.
    pub failed_passes: usize,
    /// Passes that completed with at least one failed action.
    pub partial_passes: usize,
}

/// Start the scheduler and block the current thread until ctrl-c.
pub fn start_blocking(
    home: &Path,
    period: Duration,
    options: RunOptions,
) -> Result<ScheduleStats, DaemonError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf(), period, options))
}

async fn run(home: PathBuf, period: Duration, options: RunOptions) -> Result<ScheduleStats, DaemonError> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("received ctrl-c, stopping after the current pass");
                    let _ = shutdown.send(());
                    Ok(())
                }
                Err(err) => {
                    let _ = shutdown.send(());
                    Err(io_err("ctrl-c handler", err))
                }
            }
        })
    };

    tracing::info!(
        "reconciling every {}s (dry_run={})",
        period.as_secs(),
        options.dry_run
    );

    let stats = run_schedule(
        period,
        move || {
            let home = home.clone();
            async move {
                tokio::task::spawn_blocking(move || pass::run_once(&home, options))
                    .await
                    .unwrap_or_else(|err| Err(DaemonError::Join(err.to_string())))
            }
        },
        shutdown_rx,
    )
    .await;

    signal_handle.abort();
    tracing::info!(
        "scheduler stopped after {} pass(es), {} failed",
        stats.passes,
        stats.failed_passes
    );
    Ok(stats)
}

/// Run `pass` immediately and then once per `period` until `shutdown` fires.
///
/// Passes never overlap: the next tick is not awaited until the current pass
/// returns, and a pass that overruns `period` delays the schedule instead of
/// queueing catch-up passes. Shutdown is only observed between passes.
pub async fn run_schedule<F, Fut>(
    period: Duration,
    mut pass: F,
    mut shutdown: broadcast::Receiver<()>,
) -> ScheduleStats
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RunReport, DaemonError>>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = ScheduleStats::default();

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            _ = ticker.tick() => {
                let started = Instant::now();
                stats.passes += 1;
                match pass().await {
                    Ok(report) => {
                        let failed = report.failed_count();
                        if failed > 0 {
                            stats.partial_passes += 1;
                        }
                        tracing::info!(
                            applied = report.applied_count(),
                            failed,
                            duration_ms = started.elapsed().as_millis() as u64,
                            "scheduled pass completed",
                        );
                    }
                    Err(err) => {
                        stats.failed_passes += 1;
                        tracing::error!(error = %err, "scheduled pass failed");
                    }
                }
            }
        }
    }

    stats
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// Logs go to stderr so `--json` reports on stdout stay parseable.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
