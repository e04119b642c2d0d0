//! notorii core library: domain types, source wire shapes, configuration.
//!
//! - [`types`]: newtypes, [`NormalizedRecord`] and [`AppPatch`]
//! - [`notion`] / [`torii`]: raw record shapes as each catalog serves them
//! - [`config`]: `~/.notorii/config.yaml` load / save
//! - [`error`]: [`ConfigError`], [`ShapeMismatch`]

pub mod config;
pub mod error;
pub mod notion;
pub mod torii;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, ShapeMismatch};
pub use types::{
    AppFields, AppName, AppPatch, AppState, NormalizedRecord, RemoteId, Source, TimeField,
};
