//! A single reconciliation pass wired to the live Notion and Torii clients.

use std::path::Path;

use notorii_core::{config, Config};
use notorii_remote::{NotionClient, ToriiClient};
use notorii_sync::{pipeline, RunOptions, RunReport};

use crate::error::DaemonError;

/// Load `<home>/.notorii/config.yaml` (plus env overrides) and run one pass.
///
/// Config is re-read on every call so a running daemon picks up edits.
pub fn run_once(home: &Path, options: RunOptions) -> Result<RunReport, DaemonError> {
    let config = config::load_effective_at(home)?;
    run_once_with(&config, options)
}

/// Run one pass against the catalogs described by `config`.
pub fn run_once_with(config: &Config, options: RunOptions) -> Result<RunReport, DaemonError> {
    let mut notion = NotionClient::from_config(&config.notion)?;
    let mut torii = ToriiClient::from_config(&config.torii)?;
    Ok(pipeline::run(&mut notion, &mut torii, options)?)
}
