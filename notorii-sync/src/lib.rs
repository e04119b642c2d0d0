//! # notorii-sync
//!
//! Reconciliation core: normalize both catalogs, index them by app name,
//! diff, detect staleness, gate no-op updates, dispatch.
//!
//! Call [`pipeline::run`] with a Notion and a Torii [`AppStore`] to perform
//! one stateless pass, or [`plan::plan`] to compute the action sets from two
//! already-indexed snapshots without touching either catalog.

pub mod diff;
pub mod error;
pub mod gate;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod plan;
pub mod staleness;
pub mod store;

pub use error::{RemoteError, SyncError};
pub use index::KeyedMap;
pub use normalize::Normalize;
pub use pipeline::{run, DispatchRecord, Outcome, Phase, RunOptions, RunReport};
pub use plan::{ReconcilePlan, UpdateAction};
pub use store::AppStore;
