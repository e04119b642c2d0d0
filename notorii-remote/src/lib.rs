//! # notorii-remote
//!
//! Blocking HTTP adapters implementing [`notorii_sync::AppStore`] for the two
//! catalogs. Both clients are built once per pass from configuration and
//! handed to [`notorii_sync::run`] explicitly.

mod http;
pub mod notion;
pub mod secret;
pub mod torii;

pub use notion::NotionClient;
pub use torii::ToriiClient;
