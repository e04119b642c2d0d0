use std::path::PathBuf;

use thiserror::Error;

/// Error surface for a configured pass and the scheduler around it.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] notorii_core::ConfigError),

    #[error("{0}")]
    Remote(#[from] notorii_sync::RemoteError),

    #[error("reconciliation aborted: {0}")]
    Sync(#[from] notorii_sync::SyncError),

    #[error("pass task failed to complete: {0}")]
    Join(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
