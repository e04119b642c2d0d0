//! Left-only set difference between two indexed sides.

use notorii_core::NormalizedRecord;

use crate::index::KeyedMap;

/// Records of `left` whose key has no entry in `right`, in `left` key order.
///
/// Run once per direction; the two calls are independent and their outputs
/// share no ordering guarantee.
pub fn missing<'a>(left: &'a KeyedMap, right: &KeyedMap) -> Vec<&'a NormalizedRecord> {
    let missing: Vec<_> = left
        .iter()
        .filter(|(key, _)| right.get(key).is_none())
        .map(|(_, record)| record)
        .collect();

    for record in &missing {
        tracing::info!("missing in {}: {}", right.source(), record.key);
    }
    missing
}
