//! Notion database adapter.
//!
//! Pages are listed with `POST /v1/databases/{id}/query`, following
//! `next_cursor` until `has_more` is false. Writes go through `/v1/pages`.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use notorii_core::{
    config::NotionConfig,
    notion::{NotionPage, QueryResponse},
    AppFields, AppPatch, NormalizedRecord, RemoteId,
};
use notorii_sync::{AppStore, RemoteError};

use crate::{http::Http, secret};

/// Upper bound Notion accepts for `page_size`.
const PAGE_SIZE: u32 = 100;

#[derive(Debug)]
pub struct NotionClient {
    http: Http,
    database_id: String,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

impl NotionClient {
    pub fn new(base_url: &str, token: String, database_id: &str, notion_version: &str) -> Self {
        Self {
            http: Http::new(base_url, token).with_header("Notion-Version", notion_version),
            database_id: database_id.to_string(),
        }
    }

    /// Build a client from config, reading the token from `token_env`.
    pub fn from_config(config: &NotionConfig) -> Result<Self, RemoteError> {
        let database_id = config.require_database_id()?;
        let token = secret::from_env(&config.token_env)?;
        Ok(Self::new(
            &config.base_url,
            token,
            database_id,
            &config.notion_version,
        ))
    }

    /// Every page of the database, across all result pages.
    pub fn query_all(&self) -> Result<Vec<NotionPage>, RemoteError> {
        let path = format!("/v1/databases/{}/query", self.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": PAGE_SIZE });
            if let Some(c) = &cursor {
                body["start_cursor"] = json!(c);
            }
            let response: QueryResponse = self.http.send("POST", &path, &body)?;

            for page in response.results {
                if !page.is_page() {
                    return Err(RemoteError::Rejected(format!(
                        "query returned a `{}` object; only full pages are supported",
                        page.object
                    )));
                }
                pages.push(page);
            }

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!("notion query returned {} page(s)", pages.len());
        Ok(pages)
    }

    pub fn create_page(&self, fields: &AppFields) -> Result<RemoteId, RemoteError> {
        let body = create_page_body(&self.database_id, fields);
        let created: PageRef = self.http.send("POST", "/v1/pages", &body)?;
        tracing::info!("added '{}' to notion database as {}", fields.name, created.id);
        Ok(RemoteId::from(created.id))
    }

    pub fn update_page(&self, id: &RemoteId, patch: &AppPatch) -> Result<(), RemoteError> {
        let body = update_page_body(patch);
        let _: PageRef = self
            .http
            .send("PATCH", &format!("/v1/pages/{}", id), &body)?;
        Ok(())
    }
}

impl AppStore for NotionClient {
    type Raw = NotionPage;

    fn fetch_all(&mut self) -> Result<Vec<NotionPage>, RemoteError> {
        self.query_all()
    }

    fn create(&mut self, record: &NormalizedRecord) -> Result<RemoteId, RemoteError> {
        self.create_page(&record.fields)
    }

    fn update(&mut self, id: &RemoteId, patch: &AppPatch) -> Result<(), RemoteError> {
        self.update_page(id, patch)
    }
}

/// `POST /v1/pages` body for a new database row.
pub fn create_page_body(database_id: &str, fields: &AppFields) -> Value {
    let mut properties = Map::new();
    properties.insert("Name".into(), title(&fields.name));
    properties.insert("URL".into(), json!({ "url": fields.url }));
    properties.insert("State".into(), json!({ "select": { "name": fields.state.as_str() } }));
    properties.insert(
        "Description".into(),
        rich_text(fields.description.as_deref().unwrap_or("")),
    );
    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
    })
}

/// `PATCH /v1/pages/{id}` body carrying only the patched properties.
pub fn update_page_body(patch: &AppPatch) -> Value {
    let mut properties = Map::new();
    if let Some(name) = &patch.name {
        properties.insert("Name".into(), title(name));
    }
    if let Some(url) = &patch.url {
        properties.insert("URL".into(), json!({ "url": url }));
    }
    if let Some(state) = patch.state {
        properties.insert("State".into(), json!({ "select": { "name": state.as_str() } }));
    }
    if let Some(description) = &patch.description {
        properties.insert("Description".into(), rich_text(description));
    }
    json!({ "properties": properties })
}

fn title(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

// Notion rejects empty text runs, so an empty description is an empty array.
fn rich_text(text: &str) -> Value {
    if text.is_empty() {
        json!({ "rich_text": [] })
    } else {
        json!({ "rich_text": [{ "text": { "content": text } }] })
    }
}
