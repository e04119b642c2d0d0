//! Error types for notorii-sync.

use thiserror::Error;

use notorii_core::{AppName, ConfigError, ShapeMismatch, Source, TimeField};

/// Errors that abort a reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A source record lacks a required attribute or carries an invalid one.
    #[error("malformed {side} record {id}: {reason}")]
    MalformedRecord {
        side: Source,
        id: String,
        reason: String,
    },

    /// A record reached indexing without a usable key.
    #[error("empty key in {side} record at position {position}")]
    EmptyKey { side: Source, position: usize },

    /// A designated time field could not be parsed as an RFC 3339 instant.
    #[error("invalid timestamp {value:?} in {field} of '{key}': {source}")]
    InvalidTimestamp {
        key: AppName,
        field: TimeField,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A time field was requested from a record of the other source.
    #[error(transparent)]
    FieldNotInShape(#[from] ShapeMismatch),

    /// Listing a catalog failed; the pass cannot proceed on a partial picture.
    #[error("failed to fetch {side} records: {error}")]
    Fetch {
        side: Source,
        #[source]
        error: RemoteError,
    },
}

/// Failures of a single call against a remote catalog.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-2xx response.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The environment variable holding a bearer token is unset or blank.
    #[error("secret `{name}` is not set")]
    Secret { name: String },

    /// The catalog answered with something notorii refuses to handle.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Client construction failed on configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub(crate) fn malformed(side: Source, id: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::MalformedRecord {
        side,
        id: id.into(),
        reason: reason.into(),
    }
}
