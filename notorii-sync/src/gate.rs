//! Field-equality gate.
//!
//! Timestamps drift whenever a catalog re-saves unchanged data, so a stale
//! candidate is only acted on when a meaningful field actually differs.
//! An absent description and an empty one compare equal.

use notorii_core::{AppFields, AppPatch, NormalizedRecord};

/// `true` when the two records carry the same name, url, state, and
/// description, meaning the update can be skipped.
pub fn fields_equal(candidate: &NormalizedRecord, counterpart: &NormalizedRecord) -> bool {
    same_fields(&candidate.fields, &counterpart.fields)
}

fn same_fields(a: &AppFields, b: &AppFields) -> bool {
    a.name == b.name && a.url == b.url && a.state == b.state && description(a) == description(b)
}

fn description(fields: &AppFields) -> &str {
    fields.description.as_deref().unwrap_or("")
}

/// Patch that brings `counterpart` in line with `candidate`, touching only
/// the fields that differ.
pub fn patch_between(candidate: &NormalizedRecord, counterpart: &NormalizedRecord) -> AppPatch {
    let (new, old) = (&candidate.fields, &counterpart.fields);
    AppPatch {
        name: (new.name != old.name).then(|| new.name.clone()),
        url: (new.url != old.url).then(|| new.url.clone()),
        state: (new.state != old.state).then_some(new.state),
        description: (description(new) != description(old)).then(|| description(new).to_string()),
    }
}
