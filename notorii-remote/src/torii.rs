//! Torii `/v1.0` adapter.
//!
//! Creating an app prefers Torii's known-app catalog: a name found there is
//! adopted by catalog id and then aligned with the record's fields, anything
//! else becomes a custom app. The catalog is
//! fetched lazily on the first create of a pass and reused afterwards.

use std::collections::HashMap;

use notorii_core::{
    config::ToriiConfig,
    torii::{AddKnownApp, CreateCustomApp, KnownApp, ToriiApp, UpdateApp},
    AppPatch, NormalizedRecord, RemoteId,
};
use notorii_sync::{gate, AppStore, Normalize, RemoteError};

use crate::{http::Http, secret};

#[derive(Debug)]
pub struct ToriiClient {
    http: Http,
    custom_category: String,
    known: Option<HashMap<String, u64>>,
}

impl ToriiClient {
    pub fn new(base_url: &str, token: String, custom_category: &str) -> Self {
        Self {
            http: Http::new(base_url, token),
            custom_category: custom_category.to_string(),
            known: None,
        }
    }

    /// Build a client from config, reading the token from `token_env`.
    pub fn from_config(config: &ToriiConfig) -> Result<Self, RemoteError> {
        let token = secret::from_env(&config.token_env)?;
        Ok(Self::new(&config.base_url, token, &config.custom_category))
    }

    pub fn list_apps(&self) -> Result<Vec<ToriiApp>, RemoteError> {
        self.http.get("/v1.0/apps")
    }

    pub fn list_known_apps(&self) -> Result<Vec<KnownApp>, RemoteError> {
        self.http.get("/v1.0/apps/known")
    }

    pub fn create_custom_app(&self, body: &CreateCustomApp) -> Result<ToriiApp, RemoteError> {
        self.http.send("POST", "/v1.0/apps/custom", body)
    }

    pub fn add_known_app(&self, id: u64) -> Result<ToriiApp, RemoteError> {
        self.http.send("POST", "/v1.0/apps", &AddKnownApp { id_app: id })
    }

    pub fn update_app(&self, id: &RemoteId, body: &UpdateApp) -> Result<ToriiApp, RemoteError> {
        self.http.send("PUT", &format!("/v1.0/apps/{}", id), body)
    }

    /// Catalog id for `name`, loading the known-app catalog on first use.
    ///
    /// A failed load is not cached, so the next create retries it.
    fn known_id(&mut self, name: &str) -> Result<Option<u64>, RemoteError> {
        if self.known.is_none() {
            let catalog = self.list_known_apps()?;
            tracing::debug!("loaded {} known torii app(s)", catalog.len());
            self.known = Some(index_known(catalog));
        }
        Ok(self
            .known
            .as_ref()
            .and_then(|known| known.get(name).copied()))
    }
}

impl AppStore for ToriiClient {
    type Raw = ToriiApp;

    fn fetch_all(&mut self) -> Result<Vec<ToriiApp>, RemoteError> {
        self.list_apps()
    }

    fn create(&mut self, record: &NormalizedRecord) -> Result<RemoteId, RemoteError> {
        let name = record.fields.name.as_str();
        let created = match self.known_id(name)? {
            Some(known) => {
                tracing::info!("'{}' is a known torii app ({}), adopting", name, known);
                let adopted = self.add_known_app(known)?;
                let patch = adoption_patch(record, &adopted);
                if !patch.is_empty() {
                    tracing::info!(
                        "aligning adopted '{}' with notion ({})",
                        name,
                        patch.changed_fields().join(", ")
                    );
                    self.update_app(&RemoteId::from(adopted.id), &update_body(&patch))?;
                }
                adopted
            }
            None => {
                tracing::info!("'{}' is not a known torii app, creating custom app", name);
                self.create_custom_app(&custom_app_body(record, &self.custom_category))?
            }
        };
        Ok(RemoteId::from(created.id))
    }

    fn update(&mut self, id: &RemoteId, patch: &AppPatch) -> Result<(), RemoteError> {
        self.update_app(id, &update_body(patch))?;
        Ok(())
    }
}

/// Last entry wins on duplicate catalog names.
fn index_known(catalog: Vec<KnownApp>) -> HashMap<String, u64> {
    catalog.into_iter().map(|app| (app.name, app.id)).collect()
}

/// Fields an adopted catalog app must take from `record`.
///
/// Torii fills a known app with catalog defaults; anything that differs
/// from the record under the gate's rules is written back, so the adopted
/// app never looks like a newer edit on the next pass. An adopted app that
/// does not normalize gets every field.
pub fn adoption_patch(record: &NormalizedRecord, adopted: &ToriiApp) -> AppPatch {
    match adopted.normalize() {
        Ok(current) => gate::patch_between(record, &current),
        Err(_) => {
            let fields = &record.fields;
            AppPatch {
                name: Some(fields.name.clone()),
                url: Some(fields.url.clone()),
                state: Some(fields.state),
                description: Some(fields.description.clone().unwrap_or_default()),
            }
        }
    }
}

pub fn custom_app_body(record: &NormalizedRecord, category: &str) -> CreateCustomApp {
    let fields = &record.fields;
    CreateCustomApp {
        name: fields.name.clone(),
        state: fields.state,
        url: fields.url.clone(),
        category: category.to_string(),
        description: fields.description.clone().unwrap_or_default(),
        tags: None,
    }
}

pub fn update_body(patch: &AppPatch) -> UpdateApp {
    UpdateApp {
        name: patch.name.clone(),
        state: patch.state,
        url: patch.url.clone(),
        description: patch.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use notorii_core::{AppFields, AppName, AppState, Source};

    use super::*;

    fn record() -> NormalizedRecord {
        NormalizedRecord {
            key: AppName::from("Linear"),
            fields: AppFields {
                name: "Linear".into(),
                url: "https://linear.app".into(),
                state: AppState::Discovered,
                description: None,
            },
            modified_at: "2024-01-01T00:00:00Z".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            source: Source::Notion,
            remote_id: RemoteId::from("page-1"),
        }
    }

    #[test]
    fn custom_body_uses_configured_category_and_empty_description() {
        let body = custom_app_body(&record(), "Developer Tools");
        assert_eq!(body.category, "Developer Tools");
        assert_eq!(body.description, "");
        assert_eq!(body.state, AppState::Discovered);
    }

    #[test]
    fn update_body_mirrors_patch() {
        let patch = AppPatch {
            url: Some("u1".into()),
            ..AppPatch::default()
        };
        let body = update_body(&patch);
        assert_eq!(body.url.as_deref(), Some("u1"));
        assert!(body.name.is_none() && body.state.is_none() && body.description.is_none());
    }

    fn adopted(url: &str, state: &str, description: Option<&str>) -> ToriiApp {
        ToriiApp {
            id: 42,
            name: "Linear".into(),
            state: state.into(),
            url: url.into(),
            description: description.map(str::to_string),
            category: Some("Productivity".into()),
            is_custom: false,
            creation_time: "2024-05-01T00:00:00Z".into(),
            last_updated_at: "2024-05-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn adoption_patch_overrides_catalog_defaults() {
        let patch = adoption_patch(&record(), &adopted("default-42.com", "Sanctioned", Some("")));
        assert_eq!(patch.url.as_deref(), Some("https://linear.app"));
        assert_eq!(patch.state, Some(AppState::Discovered));
        assert_eq!(patch.description, None);
        assert_eq!(patch.name, None);
    }

    #[test]
    fn adoption_patch_is_empty_when_catalog_matches() {
        let patch = adoption_patch(&record(), &adopted("https://linear.app", "Discovered", None));
        assert!(patch.is_empty());
    }

    #[test]
    fn unnormalizable_adopted_app_gets_every_field() {
        let patch = adoption_patch(&record(), &adopted("", "Discovered", None));
        assert_eq!(patch.changed_fields(), vec!["name", "url", "state", "description"]);
        assert_eq!(patch.description.as_deref(), Some(""));
    }

    #[test]
    fn known_index_keeps_last_duplicate() {
        let catalog = vec![
            KnownApp { id: 1, name: "Slack".into(), url: None, category: None },
            KnownApp { id: 2, name: "Slack".into(), url: None, category: None },
        ];
        assert_eq!(index_known(catalog).get("Slack"), Some(&2));
    }
}
