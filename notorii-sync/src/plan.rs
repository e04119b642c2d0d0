//! Pure planning stage: two indexed snapshots in, action sets out.
//!
//! Stages run in a fixed order: missing in each direction, stale candidates
//! in each direction, then the equality gate over those candidates.

use serde::Serialize;

use notorii_core::{AppName, AppPatch, NormalizedRecord, RemoteId, Source, TimeField};

use crate::{diff, error::SyncError, gate, index::KeyedMap, staleness};

/// A one-way field update of an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateAction {
    pub key: AppName,
    /// Catalog receiving the update.
    pub target: Source,
    pub target_id: RemoteId,
    pub patch: AppPatch,
}

/// Everything one pass intends to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    pub missing_in_torii: Vec<NormalizedRecord>,
    pub missing_in_notion: Vec<NormalizedRecord>,
    pub update_torii: Vec<UpdateAction>,
    pub update_notion: Vec<UpdateAction>,
    /// Stale candidates dropped by the equality gate.
    pub suppressed: Vec<AppName>,
}

impl ReconcilePlan {
    pub fn action_count(&self) -> usize {
        self.missing_in_torii.len()
            + self.missing_in_notion.len()
            + self.update_torii.len()
            + self.update_notion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }
}

/// Compute the action sets for one pass.
pub fn plan(notion: &KeyedMap, torii: &KeyedMap) -> Result<ReconcilePlan, SyncError> {
    let missing_in_torii = cloned(diff::missing(notion, torii));
    let missing_in_notion = cloned(diff::missing(torii, notion));

    let stale_in_torii = staleness::stale_candidates(
        notion,
        TimeField::modified(Source::Notion),
        torii,
        TimeField::modified(Source::Torii),
    )?;
    let stale_in_notion = staleness::stale_candidates(
        torii,
        TimeField::modified(Source::Torii),
        notion,
        TimeField::modified(Source::Notion),
    )?;

    let mut suppressed = Vec::new();
    let update_torii = gate_updates(&stale_in_torii, torii, &mut suppressed);
    let update_notion = gate_updates(&stale_in_notion, notion, &mut suppressed);

    Ok(ReconcilePlan {
        missing_in_torii,
        missing_in_notion,
        update_torii,
        update_notion,
        suppressed,
    })
}

fn gate_updates(
    candidates: &[&NormalizedRecord],
    counterparts: &KeyedMap,
    suppressed: &mut Vec<AppName>,
) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    for candidate in candidates {
        // Candidates only exist for keys present on both sides.
        let Some(counterpart) = counterparts.get(&candidate.key) else {
            continue;
        };
        if gate::fields_equal(candidate, counterpart) {
            tracing::debug!("all values are same for '{}', skipping", candidate.key);
            suppressed.push(candidate.key.clone());
            continue;
        }
        actions.push(UpdateAction {
            key: candidate.key.clone(),
            target: counterparts.source(),
            target_id: counterpart.remote_id.clone(),
            patch: gate::patch_between(candidate, counterpart),
        });
    }
    actions
}

fn cloned(records: Vec<&NormalizedRecord>) -> Vec<NormalizedRecord> {
    records.into_iter().cloned().collect()
}
