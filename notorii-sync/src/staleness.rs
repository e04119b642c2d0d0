//! Staleness detection between the two sides.
//!
//! A left record is stale-on-the-right when its designated timestamp is
//! strictly later than the right counterpart's. Keys present on one side only
//! are ignored here; creation is handled by [`crate::diff`].
//!
//! This stage deliberately over-selects. The equality gate in
//! [`crate::gate`] filters out candidates whose fields are unchanged.

use chrono::{DateTime, Utc};

use notorii_core::{NormalizedRecord, TimeField};

use crate::{error::SyncError, index::KeyedMap};

/// Left records newer than their right counterpart, in `left` key order.
///
/// A timestamp that does not parse aborts with
/// [`SyncError::InvalidTimestamp`]; it is never treated as stale or fresh.
pub fn stale_candidates<'a>(
    left: &'a KeyedMap,
    left_field: TimeField,
    right: &KeyedMap,
    right_field: TimeField,
) -> Result<Vec<&'a NormalizedRecord>, SyncError> {
    let mut stale = Vec::new();

    for (key, left_item) in left.iter() {
        let Some(right_item) = right.get(key) else {
            continue;
        };

        let left_time = parse_instant(left_item, left_field)?;
        let right_time = parse_instant(right_item, right_field)?;

        if left_time > right_time {
            tracing::debug!(
                "{} newer than {} for '{}' by {}",
                left_field,
                right_field,
                key,
                format_lag(left_time, right_time)
            );
            stale.push(left_item);
        }
    }

    Ok(stale)
}

/// Parse `record`'s `field` as an RFC 3339 instant.
pub fn parse_instant(record: &NormalizedRecord, field: TimeField) -> Result<DateTime<Utc>, SyncError> {
    let raw = record.timestamp(field)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| SyncError::InvalidTimestamp {
            key: record.key.clone(),
            field,
            value: raw.to_string(),
            source,
        })
}

/// Compact human age of `newer - older`, e.g. `"3h"`.
pub fn format_lag(newer: DateTime<Utc>, older: DateTime<Utc>) -> String {
    let seconds = newer.signed_duration_since(older).num_seconds().max(0) as u64;
    format_seconds(seconds)
}

fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
