//! Error types for notorii-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Source, TimeField};

/// All errors that can arise from loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, unreadable directory, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.notorii/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// `config init` would clobber an existing file.
    #[error("config already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    /// A setting required to reach a catalog is unset.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

/// A time field was read from a record of the wrong source shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{}` does not exist on {shape} records", .field.wire_name())]
pub struct ShapeMismatch {
    pub field: TimeField,
    pub shape: Source,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
