//! Domain types shared by every notorii crate.
//!
//! Records from both catalogs are reduced to a [`NormalizedRecord`] before any
//! comparison happens; nothing downstream of normalization looks at a raw
//! source shape again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShapeMismatch;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Business key correlating records across catalogs (the application name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppName(pub String);

impl AppName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AppName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a record inside its own catalog (Notion page id, Torii app id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId(pub String);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u64> for RemoteId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// One of the two catalogs being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Notion,
    Torii,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Notion => write!(f, "notion"),
            Source::Torii => write!(f, "torii"),
        }
    }
}

/// Lifecycle state of an application. Both catalogs share the same vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppState {
    Discovered,
    Sanctioned,
    Closed,
}

impl AppState {
    pub fn as_str(self) -> &'static str {
        match self {
            AppState::Discovered => "Discovered",
            AppState::Sanctioned => "Sanctioned",
            AppState::Closed => "Closed",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Discovered" => Ok(AppState::Discovered),
            "Sanctioned" => Ok(AppState::Sanctioned),
            "Closed" => Ok(AppState::Closed),
            other => Err(format!(
                "unknown app state '{other}'; expected: Discovered, Sanctioned, Closed"
            )),
        }
    }
}

/// A timestamp attribute of one particular source shape.
///
/// Each variant belongs to exactly one [`Source`]; reading a field from a
/// record of the other source is rejected at runtime by
/// [`NormalizedRecord::timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    NotionLastEdited,
    NotionCreated,
    ToriiLastUpdated,
    ToriiCreated,
}

impl TimeField {
    pub fn source(self) -> Source {
        match self {
            TimeField::NotionLastEdited | TimeField::NotionCreated => Source::Notion,
            TimeField::ToriiLastUpdated | TimeField::ToriiCreated => Source::Torii,
        }
    }

    /// Attribute name as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            TimeField::NotionLastEdited => "last_edited_time",
            TimeField::NotionCreated => "created_time",
            TimeField::ToriiLastUpdated => "lastUpdatedAt",
            TimeField::ToriiCreated => "creationTime",
        }
    }

    /// The last-modification field for a source.
    pub fn modified(source: Source) -> Self {
        match source {
            Source::Notion => TimeField::NotionLastEdited,
            Source::Torii => TimeField::ToriiLastUpdated,
        }
    }
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source(), self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Comparison-relevant attributes of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFields {
    pub name: String,
    pub url: String,
    pub state: AppState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A source record reduced to the common comparison shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub key: AppName,
    pub fields: AppFields,
    /// Source-reported last modification instant, unparsed.
    pub modified_at: String,
    pub created_at: String,
    pub source: Source,
    pub remote_id: RemoteId,
}

impl NormalizedRecord {
    /// Read a designated timestamp attribute.
    ///
    /// Fails when `field` belongs to the other source's shape.
    pub fn timestamp(&self, field: TimeField) -> Result<&str, ShapeMismatch> {
        if field.source() != self.source {
            return Err(ShapeMismatch {
                field,
                shape: self.source,
            });
        }
        Ok(match field {
            TimeField::NotionLastEdited | TimeField::ToriiLastUpdated => &self.modified_at,
            TimeField::NotionCreated | TimeField::ToriiCreated => &self.created_at,
        })
    }
}

/// Partial field update sent to a catalog. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AppState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AppPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.state.is_none() && self.description.is_none()
    }

    /// Names of the fields this patch touches, in a stable order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.name.is_some() {
            out.push("name");
        }
        if self.url.is_some() {
            out.push("url");
        }
        if self.state.is_some() {
            out.push("state");
        }
        if self.description.is_some() {
            out.push("description");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
