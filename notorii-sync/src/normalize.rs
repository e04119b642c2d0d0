//! Source shape → [`NormalizedRecord`].
//!
//! A record without a usable name fails the whole side: every later stage
//! correlates by name, so silently dropping one would turn it into a spurious
//! create on the other catalog.

use notorii_core::{
    notion::{plain_text, NotionPage},
    torii::ToriiApp,
    AppFields, AppName, AppState, NormalizedRecord, RemoteId, Source,
};

use crate::error::{malformed, SyncError};

/// A native record shape that can be reduced to the comparison shape.
pub trait Normalize {
    /// Catalog this shape comes from.
    const SOURCE: Source;

    fn normalize(&self) -> Result<NormalizedRecord, SyncError>;
}

/// Normalize every record of one side, stopping at the first failure.
pub fn normalize_all<R: Normalize>(raws: &[R]) -> Result<Vec<NormalizedRecord>, SyncError> {
    raws.iter().map(Normalize::normalize).collect()
}

impl Normalize for NotionPage {
    const SOURCE: Source = Source::Notion;

    fn normalize(&self) -> Result<NormalizedRecord, SyncError> {
        let props = &self.properties;

        let name = plain_text(&props.name.title).trim().to_string();
        if name.is_empty() {
            return Err(malformed(Self::SOURCE, &self.id, "Name title is empty"));
        }

        let url = props
            .url
            .as_ref()
            .and_then(|u| u.url.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| malformed(Self::SOURCE, &self.id, format!("'{name}' has no URL")))?
            .to_string();

        let state_name = props
            .state
            .as_ref()
            .and_then(|s| s.select.as_ref())
            .map(|s| s.name.as_str())
            .ok_or_else(|| malformed(Self::SOURCE, &self.id, format!("'{name}' has no State")))?;
        let state = parse_state(Self::SOURCE, &self.id, state_name)?;

        let description = props
            .description
            .as_ref()
            .map(|d| plain_text(&d.rich_text))
            .filter(|d| !d.is_empty());

        Ok(NormalizedRecord {
            key: AppName::from(name.clone()),
            fields: AppFields {
                name,
                url,
                state,
                description,
            },
            modified_at: self.last_edited_time.clone(),
            created_at: self.created_time.clone(),
            source: Self::SOURCE,
            remote_id: RemoteId::from(self.id.clone()),
        })
    }
}

impl Normalize for ToriiApp {
    const SOURCE: Source = Source::Torii;

    fn normalize(&self) -> Result<NormalizedRecord, SyncError> {
        let id = self.id.to_string();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(malformed(Self::SOURCE, id, "name is empty"));
        }

        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(malformed(Self::SOURCE, id, format!("'{name}' has no url")));
        }

        let state = parse_state(Self::SOURCE, &id, &self.state)?;

        Ok(NormalizedRecord {
            key: AppName::from(name.clone()),
            fields: AppFields {
                name,
                url,
                state,
                description: self.description.clone().filter(|d| !d.is_empty()),
            },
            modified_at: self.last_updated_at.clone(),
            created_at: self.creation_time.clone(),
            source: Self::SOURCE,
            remote_id: RemoteId::from(self.id),
        })
    }
}

fn parse_state(side: Source, id: &str, raw: &str) -> Result<AppState, SyncError> {
    raw.parse().map_err(|reason: String| malformed(side, id, reason))
}

#[cfg(test)]
mod tests {
    use notorii_core::notion::{
        NotionAppProperties, RichText, RichTextProperty, SelectOption, SelectProperty,
        TitleProperty, UrlProperty,
    };

    use super::*;

    fn text(s: &str) -> RichText {
        RichText {
            plain_text: s.to_string(),
        }
    }

    fn page(name: &str, url: Option<&str>, state: Option<&str>, desc: Option<&str>) -> NotionPage {
        NotionPage {
            object: "page".into(),
            id: "page-1".into(),
            created_time: "2024-01-01T00:00:00.000Z".into(),
            last_edited_time: "2024-03-01T00:00:00.000Z".into(),
            properties: NotionAppProperties {
                name: TitleProperty {
                    title: if name.is_empty() { vec![] } else { vec![text(name)] },
                },
                url: Some(UrlProperty {
                    url: url.map(str::to_string),
                }),
                state: Some(SelectProperty {
                    select: state.map(|s| SelectOption { name: s.into() }),
                }),
                description: desc.map(|d| RichTextProperty {
                    rich_text: vec![text(d)],
                }),
            },
        }
    }

    fn app(name: &str, state: &str, description: Option<&str>) -> ToriiApp {
        ToriiApp {
            id: 12,
            name: name.into(),
            state: state.into(),
            url: "https://slack.com".into(),
            description: description.map(str::to_string),
            category: Some("Other".into()),
            is_custom: true,
            creation_time: "2024-01-01T00:00:00Z".into(),
            last_updated_at: "2024-02-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn notion_page_normalizes() {
        let rec = page("Figma", Some("https://figma.com"), Some("Sanctioned"), Some("design"))
            .normalize()
            .expect("normalize");
        assert_eq!(rec.key, AppName::from("Figma"));
        assert_eq!(rec.fields.url, "https://figma.com");
        assert_eq!(rec.fields.state, AppState::Sanctioned);
        assert_eq!(rec.fields.description.as_deref(), Some("design"));
        assert_eq!(rec.modified_at, "2024-03-01T00:00:00.000Z");
        assert_eq!(rec.source, Source::Notion);
        assert_eq!(rec.remote_id, RemoteId::from("page-1"));
    }

    #[test]
    fn notion_name_is_trimmed_into_key() {
        let rec = page("  Figma ", Some("https://figma.com"), Some("Closed"), None)
            .normalize()
            .expect("normalize");
        assert_eq!(rec.key.as_str(), "Figma");
        assert_eq!(rec.fields.name, "Figma");
    }

    #[test]
    fn notion_multi_run_title_is_concatenated() {
        let mut p = page("Fig", Some("https://figma.com"), Some("Closed"), None);
        p.properties.name.title.push(text("ma"));
        assert_eq!(p.normalize().unwrap().key.as_str(), "Figma");
    }

    #[test]
    fn notion_empty_description_becomes_none() {
        let rec = page("Figma", Some("https://figma.com"), Some("Closed"), Some(""))
            .normalize()
            .expect("normalize");
        assert_eq!(rec.fields.description, None);
    }

    #[test]
    fn notion_missing_title_is_malformed() {
        let err = page("", Some("https://figma.com"), Some("Closed"), None)
            .normalize()
            .unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { side: Source::Notion, .. }), "got: {err}");
        assert!(err.to_string().contains("page-1"));
    }

    #[test]
    fn notion_missing_url_is_malformed() {
        let err = page("Figma", None, Some("Closed"), None).normalize().unwrap_err();
        assert!(err.to_string().contains("no URL"), "got: {err}");
    }

    #[test]
    fn notion_missing_state_is_malformed() {
        let err = page("Figma", Some("https://figma.com"), None, None)
            .normalize()
            .unwrap_err();
        assert!(err.to_string().contains("no State"), "got: {err}");
    }

    #[test]
    fn unknown_state_is_malformed() {
        let err = page("Figma", Some("https://figma.com"), Some("Archived"), None)
            .normalize()
            .unwrap_err();
        assert!(err.to_string().contains("unknown app state"), "got: {err}");
    }

    #[test]
    fn torii_app_normalizes() {
        let rec = app("Slack", "Discovered", Some("chat")).normalize().expect("normalize");
        assert_eq!(rec.key, AppName::from("Slack"));
        assert_eq!(rec.fields.state, AppState::Discovered);
        assert_eq!(rec.remote_id, RemoteId::from("12"));
        assert_eq!(rec.modified_at, "2024-02-01T00:00:00Z");
        assert_eq!(rec.created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn torii_blank_name_is_malformed() {
        let err = app("   ", "Discovered", None).normalize().unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { side: Source::Torii, .. }), "got: {err}");
    }

    #[test]
    fn normalize_all_aborts_on_first_bad_record() {
        let raws = vec![app("Slack", "Closed", None), app("", "Closed", None)];
        assert!(normalize_all(&raws).is_err());

        let good = vec![app("Slack", "Closed", None), app("Zoom", "Sanctioned", None)];
        assert_eq!(normalize_all(&good).expect("normalize").len(), 2);
    }
}
