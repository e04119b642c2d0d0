//! Reconciliation driver shared by the CLI and the daemon.
//!
//! One pass:
//!
//! 1. Fetch Notion, then Torii. Either failure aborts the pass.
//! 2. Normalize and index each side. Any structural error aborts the pass.
//! 3. Plan (see [`crate::plan`]).
//! 4. Dispatch, strictly in this order and one item at a time:
//!    create-in-Torii, update-Torii, create-in-Notion, update-Notion.
//!    A failing item is logged and recorded; the remaining items and phases
//!    still run.

use std::fmt;

use serde::Serialize;

use notorii_core::{
    notion::NotionPage, torii::ToriiApp, AppName, NormalizedRecord, RemoteId, Source,
};

use crate::{
    error::SyncError,
    index::KeyedMap,
    normalize::{normalize_all, Normalize},
    plan::{self, ReconcilePlan, UpdateAction},
    store::AppStore,
};

/// Options for a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Plan everything, call no apply operation.
    pub dry_run: bool,
}

/// Dispatch phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CreateInTorii,
    UpdateTorii,
    CreateInNotion,
    UpdateNotion,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::CreateInTorii => write!(f, "create-in-torii"),
            Phase::UpdateTorii => write!(f, "update-torii"),
            Phase::CreateInNotion => write!(f, "create-in-notion"),
            Phase::UpdateNotion => write!(f, "update-notion"),
        }
    }
}

/// What happened to a single planned action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The catalog accepted the write. Creates report the new id.
    Applied { id: Option<RemoteId> },
    /// `dry_run` mode: the write *would* have been issued.
    WouldApply,
    /// The catalog rejected the write or could not be reached.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRecord {
    pub phase: Phase,
    pub key: AppName,
    pub outcome: Outcome,
}

/// Result of a pass that got as far as dispatching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub notion_count: usize,
    pub torii_count: usize,
    /// Keys seen more than once on a side; the last occurrence was used.
    pub notion_duplicates: Vec<AppName>,
    pub torii_duplicates: Vec<AppName>,
    pub plan: ReconcilePlan,
    pub dispatched: Vec<DispatchRecord>,
}

impl RunReport {
    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn applied_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Applied { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchRecord> {
        self.dispatched
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.dispatched.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Run one full reconciliation pass.
///
/// Returns `Err` only when the pass could not build a complete picture of
/// both catalogs. Per-item dispatch failures are reported in
/// [`RunReport::dispatched`] instead.
pub fn run<N, T>(notion: &mut N, torii: &mut T, options: RunOptions) -> Result<RunReport, SyncError>
where
    N: AppStore<Raw = NotionPage>,
    T: AppStore<Raw = ToriiApp>,
{
    tracing::info!("reconciliation pass started (dry_run={})", options.dry_run);

    let notion_map = fetch_and_index(notion)?;
    let torii_map = fetch_and_index(torii)?;
    tracing::info!(
        "indexed {} notion and {} torii apps",
        notion_map.len(),
        torii_map.len()
    );

    let plan = plan::plan(&notion_map, &torii_map)?;
    tracing::info!(
        "plan: {} to create in torii, {} to update in torii, {} to create in notion, {} to update in notion, {} suppressed",
        plan.missing_in_torii.len(),
        plan.update_torii.len(),
        plan.missing_in_notion.len(),
        plan.update_notion.len(),
        plan.suppressed.len()
    );

    let mut dispatched = Vec::with_capacity(plan.action_count());
    dispatch_creates(torii, Phase::CreateInTorii, &plan.missing_in_torii, options, &mut dispatched);
    dispatch_updates(torii, Phase::UpdateTorii, &plan.update_torii, options, &mut dispatched);
    dispatch_creates(notion, Phase::CreateInNotion, &plan.missing_in_notion, options, &mut dispatched);
    dispatch_updates(notion, Phase::UpdateNotion, &plan.update_notion, options, &mut dispatched);

    let report = RunReport {
        notion_count: notion_map.len(),
        torii_count: torii_map.len(),
        notion_duplicates: notion_map.duplicates().to_vec(),
        torii_duplicates: torii_map.duplicates().to_vec(),
        plan,
        dispatched,
    };

    let failed = report.failed_count();
    if failed > 0 {
        tracing::warn!("pass completed with {} failed action(s)", failed);
    } else {
        tracing::info!(
            "pass completed: {} action(s) {}",
            report.dispatched.len(),
            if options.dry_run { "planned" } else { "applied" }
        );
    }
    Ok(report)
}

fn fetch_and_index<S: AppStore>(store: &mut S) -> Result<KeyedMap, SyncError> {
    let side = <S::Raw as Normalize>::SOURCE;
    let raws = store
        .fetch_all()
        .map_err(|error| SyncError::Fetch { side, error })?;
    tracing::info!("{} apps retrieved from {}", raws.len(), side);
    let records = normalize_all(&raws)?;
    KeyedMap::build(side, records)
}

fn dispatch_creates<S: AppStore>(
    store: &mut S,
    phase: Phase,
    records: &[NormalizedRecord],
    options: RunOptions,
    out: &mut Vec<DispatchRecord>,
) {
    let target: Source = <S::Raw as Normalize>::SOURCE;
    for record in records {
        let outcome = if options.dry_run {
            tracing::info!("[dry-run] would add {} to {}", record.key, target);
            Outcome::WouldApply
        } else {
            tracing::info!("app {} missing in {}, adding", record.key, target);
            match store.create(record) {
                Ok(id) => Outcome::Applied { id: Some(id) },
                Err(err) => {
                    tracing::warn!("failed to add {} to {}: {}", record.key, target, err);
                    Outcome::Failed {
                        error: err.to_string(),
                    }
                }
            }
        };
        out.push(DispatchRecord {
            phase,
            key: record.key.clone(),
            outcome,
        });
    }
}

fn dispatch_updates<S: AppStore>(
    store: &mut S,
    phase: Phase,
    actions: &[UpdateAction],
    options: RunOptions,
    out: &mut Vec<DispatchRecord>,
) {
    for action in actions {
        let fields = action.patch.changed_fields().join(", ");
        let outcome = if options.dry_run {
            tracing::info!(
                "[dry-run] would update {} in {} ({})",
                action.key,
                action.target,
                fields
            );
            Outcome::WouldApply
        } else {
            tracing::info!("updating {} in {} ({})", action.key, action.target, fields);
            match store.update(&action.target_id, &action.patch) {
                Ok(()) => Outcome::Applied { id: None },
                Err(err) => {
                    tracing::warn!(
                        "failed to update {} in {}: {}",
                        action.key,
                        action.target,
                        err
                    );
                    Outcome::Failed {
                        error: err.to_string(),
                    }
                }
            }
        };
        out.push(DispatchRecord {
            phase,
            key: action.key.clone(),
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use notorii_core::{
        notion::{
            NotionAppProperties, RichText, SelectOption, SelectProperty, TitleProperty,
            UrlProperty,
        },
        AppPatch,
    };

    use crate::error::RemoteError;

    use super::*;

    #[derive(Default)]
    struct Pages {
        pages: Vec<NotionPage>,
        fail_fetch: bool,
        fail_keys: HashSet<String>,
        created: Vec<String>,
        updated: Vec<(RemoteId, AppPatch)>,
    }

    impl AppStore for Pages {
        type Raw = NotionPage;

        fn fetch_all(&mut self) -> Result<Vec<NotionPage>, RemoteError> {
            if self.fail_fetch {
                return Err(RemoteError::Transport("connection refused".into()));
            }
            Ok(self.pages.clone())
        }

        fn create(&mut self, record: &NormalizedRecord) -> Result<RemoteId, RemoteError> {
            if self.fail_keys.contains(record.key.as_str()) {
                return Err(RemoteError::Status {
                    code: 400,
                    body: "validation_error".into(),
                });
            }
            self.created.push(record.key.to_string());
            Ok(RemoteId::from(format!("page-{}", record.key)))
        }

        fn update(&mut self, id: &RemoteId, patch: &AppPatch) -> Result<(), RemoteError> {
            self.updated.push((id.clone(), patch.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Apps {
        apps: Vec<ToriiApp>,
        fail_keys: HashSet<String>,
        created: Vec<String>,
        updated: Vec<(RemoteId, AppPatch)>,
    }

    impl AppStore for Apps {
        type Raw = ToriiApp;

        fn fetch_all(&mut self) -> Result<Vec<ToriiApp>, RemoteError> {
            Ok(self.apps.clone())
        }

        fn create(&mut self, record: &NormalizedRecord) -> Result<RemoteId, RemoteError> {
            if self.fail_keys.contains(record.key.as_str()) {
                return Err(RemoteError::Status {
                    code: 500,
                    body: "boom".into(),
                });
            }
            self.created.push(record.key.to_string());
            Ok(RemoteId::from(self.created.len() as u64))
        }

        fn update(&mut self, id: &RemoteId, patch: &AppPatch) -> Result<(), RemoteError> {
            self.updated.push((id.clone(), patch.clone()));
            Ok(())
        }
    }

    fn page(id: &str, name: &str, url: &str, edited: &str) -> NotionPage {
        NotionPage {
            object: "page".into(),
            id: id.into(),
            created_time: "2024-01-01T00:00:00.000Z".into(),
            last_edited_time: edited.into(),
            properties: NotionAppProperties {
                name: TitleProperty {
                    title: vec![RichText {
                        plain_text: name.into(),
                    }],
                },
                url: Some(UrlProperty {
                    url: Some(url.into()),
                }),
                state: Some(SelectProperty {
                    select: Some(SelectOption {
                        name: "Sanctioned".into(),
                    }),
                }),
                description: None,
            },
        }
    }

    fn app(id: u64, name: &str, url: &str, updated: &str) -> ToriiApp {
        ToriiApp {
            id,
            name: name.into(),
            state: "Sanctioned".into(),
            url: url.into(),
            description: None,
            category: None,
            is_custom: true,
            creation_time: "2024-01-01T00:00:00Z".into(),
            last_updated_at: updated.into(),
        }
    }

    #[test]
    fn fetch_failure_aborts_before_any_dispatch() {
        let mut notion = Pages {
            fail_fetch: true,
            ..Pages::default()
        };
        let mut torii = Apps {
            apps: vec![app(1, "Slack", "https://slack.com", "2024-01-01T00:00:00Z")],
            ..Apps::default()
        };
        let err = run(&mut notion, &mut torii, RunOptions::default()).unwrap_err();
        assert!(matches!(err, SyncError::Fetch { side: Source::Notion, .. }), "got: {err}");
        assert!(notion.created.is_empty());
    }

    #[test]
    fn dry_run_reports_without_applying() {
        let mut notion = Pages {
            pages: vec![page("p1", "Figma", "https://figma.com", "2024-01-01T00:00:00Z")],
            ..Pages::default()
        };
        let mut torii = Apps {
            apps: vec![app(1, "Slack", "https://slack.com", "2024-01-01T00:00:00Z")],
            ..Apps::default()
        };
        let report = run(&mut notion, &mut torii, RunOptions { dry_run: true }).expect("run");
        assert_eq!(report.dispatched.len(), 2);
        assert!(report
            .dispatched
            .iter()
            .all(|r| r.outcome == Outcome::WouldApply));
        assert!(notion.created.is_empty());
        assert!(torii.created.is_empty());
    }

    #[test]
    fn phases_dispatch_in_fixed_order() {
        let mut notion = Pages {
            pages: vec![
                page("p1", "Figma", "https://figma.com", "2024-01-01T00:00:00Z"),
                page("p2", "Zoom", "https://zoom.us/new", "2024-06-01T00:00:00Z"),
                page("p3", "Miro", "https://miro.com", "2024-01-01T00:00:00Z"),
            ],
            ..Pages::default()
        };
        let mut torii = Apps {
            apps: vec![
                app(1, "Slack", "https://slack.com", "2024-01-01T00:00:00Z"),
                app(2, "Zoom", "https://zoom.us", "2024-02-01T00:00:00Z"),
                app(3, "Miro", "https://miro.com/board", "2024-06-01T00:00:00Z"),
            ],
            ..Apps::default()
        };
        let report = run(&mut notion, &mut torii, RunOptions::default()).expect("run");
        let phases: Vec<Phase> = report.dispatched.iter().map(|r| r.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::CreateInTorii,
                Phase::UpdateTorii,
                Phase::CreateInNotion,
                Phase::UpdateNotion
            ]
        );
        assert_eq!(torii.created, vec!["Figma"]);
        assert_eq!(torii.updated[0].0, RemoteId::from("2"));
        assert_eq!(notion.created, vec!["Slack"]);
        assert_eq!(notion.updated[0].0, RemoteId::from("p3"));
        assert_eq!(notion.updated[0].1.url.as_deref(), Some("https://miro.com/board"));
        assert_eq!(report.applied_count(), 4);
    }

    #[test]
    fn failing_create_does_not_stop_later_items_or_phases() {
        let mut notion = Pages {
            pages: vec![
                page("p1", "Asana", "https://asana.com", "2024-01-01T00:00:00Z"),
                page("p2", "Box", "https://box.com", "2024-01-01T00:00:00Z"),
                page("p3", "Canva", "https://canva.com", "2024-01-01T00:00:00Z"),
            ],
            ..Pages::default()
        };
        let mut torii = Apps {
            apps: vec![app(9, "Dropbox", "https://dropbox.com", "2024-01-01T00:00:00Z")],
            fail_keys: ["Asana".to_string()].into_iter().collect(),
            ..Apps::default()
        };
        let report = run(&mut notion, &mut torii, RunOptions::default()).expect("run");

        assert_eq!(torii.created, vec!["Box", "Canva"]);
        assert_eq!(notion.created, vec!["Dropbox"]);
        assert_eq!(report.failed_count(), 1);
        let failure = report.failures().next().expect("failure");
        assert_eq!(failure.key, AppName::from("Asana"));
        assert_eq!(failure.phase, Phase::CreateInTorii);
    }

    #[test]
    fn malformed_record_aborts_the_pass() {
        let mut notion = Pages {
            pages: vec![page("p1", "", "https://figma.com", "2024-01-01T00:00:00Z")],
            ..Pages::default()
        };
        let mut torii = Apps::default();
        let err = run(&mut notion, &mut torii, RunOptions::default()).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { .. }), "got: {err}");
        assert!(torii.created.is_empty());
    }

    #[test]
    fn duplicate_keys_are_reported() {
        let mut notion = Pages {
            pages: vec![
                page("p1", "Figma", "https://figma.com/old", "2024-01-01T00:00:00Z"),
                page("p2", "Figma", "https://figma.com", "2024-01-01T00:00:00Z"),
            ],
            ..Pages::default()
        };
        let mut torii = Apps::default();
        let report = run(&mut notion, &mut torii, RunOptions { dry_run: true }).expect("run");
        assert_eq!(report.notion_duplicates, vec![AppName::from("Figma")]);
        assert!(report.torii_duplicates.is_empty());
        assert_eq!(report.plan.missing_in_torii[0].fields.url, "https://figma.com");
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::CreateInTorii.to_string(), "create-in-torii");
        assert_eq!(Phase::UpdateNotion.to_string(), "update-notion");
    }
}
