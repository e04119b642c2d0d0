//! Notion database page shapes, as returned by `databases/{id}/query`.
//!
//! Any property can be null in Notion. Every property is therefore optional
//! here and presence is enforced by the normalizer, not by deserialization.

use serde::{Deserialize, Serialize};

/// One result of a database query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionPage {
    /// `"page"` for pages; queries can also yield other object kinds.
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub last_edited_time: String,
    #[serde(default)]
    pub properties: NotionAppProperties,
}

impl NotionPage {
    pub fn is_page(&self) -> bool {
        self.object == "page"
    }
}

/// The database columns notorii cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionAppProperties {
    #[serde(rename = "Name", default)]
    pub name: TitleProperty,
    #[serde(rename = "URL", default)]
    pub url: Option<UrlProperty>,
    #[serde(rename = "State", default)]
    pub state: Option<SelectProperty>,
    #[serde(rename = "Description", default)]
    pub description: Option<RichTextProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleProperty {
    #[serde(default)]
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextProperty {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlProperty {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectProperty {
    #[serde(default)]
    pub select: Option<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// Concatenate the plain text of a rich-text run.
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}

/// One page of `databases/{id}/query` results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<NotionPage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
