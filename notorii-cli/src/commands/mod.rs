pub mod config;
pub mod daemon;
pub mod plan;
pub mod run;
