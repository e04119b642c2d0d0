//! Torii `/v1.0` REST shapes.

use serde::{Deserialize, Serialize};

use crate::types::AppState;

/// An app as listed by `GET /v1.0/apps`.
///
/// `state` stays a string so an unknown state surfaces as a malformed record
/// rather than a decode failure of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToriiApp {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub creation_time: String,
    #[serde(default)]
    pub last_updated_at: String,
}

/// Entry of the static known-app catalog, `GET /v1.0/apps/known`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownApp {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Body of `POST /v1.0/apps/custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomApp {
    pub name: String,
    pub state: AppState,
    pub url: String,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Body of `POST /v1.0/apps`: adopt an app from the known-app catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddKnownApp {
    #[serde(rename = "idApp")]
    pub id_app: u64,
}

/// Body of `PUT /v1.0/apps/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateApp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AppState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
