//! Scheduled reconciliation: one pass per interval until ctrl-c.

mod error;
pub mod pass;
mod runtime;

pub use error::DaemonError;
pub use pass::{run_once, run_once_with};
pub use runtime::{init_tracing, run_schedule, start_blocking, ScheduleStats};
