//! Name-keyed index of one side's normalized records.
//!
//! Duplicate policy: the last occurrence of a key wins. Every overwritten key
//! is logged at `warn` and kept in [`KeyedMap::duplicates`]; the driver
//! copies them into its run report.

use std::collections::BTreeMap;

use notorii_core::{AppName, NormalizedRecord, Source};

use crate::error::SyncError;

/// Records of one catalog keyed by [`AppName`]. Iteration order is key order.
#[derive(Debug, Clone)]
pub struct KeyedMap {
    source: Source,
    entries: BTreeMap<AppName, NormalizedRecord>,
    duplicates: Vec<AppName>,
}

impl KeyedMap {
    /// Index `records` by key in O(n log n).
    ///
    /// Fails with [`SyncError::EmptyKey`] on the first blank key; the whole
    /// side is rejected rather than the single record.
    pub fn build<I>(source: Source, records: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = NormalizedRecord>,
    {
        let mut entries = BTreeMap::new();
        let mut duplicates = Vec::new();

        for (position, record) in records.into_iter().enumerate() {
            if record.key.is_empty() {
                return Err(SyncError::EmptyKey {
                    side: source,
                    position,
                });
            }
            let key = record.key.clone();
            if entries.insert(key.clone(), record).is_some() {
                tracing::warn!("duplicate {} key '{}': keeping last occurrence", source, key);
                duplicates.push(key);
            }
        }

        Ok(Self {
            source,
            entries,
            duplicates,
        })
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn get(&self, key: &AppName) -> Option<&NormalizedRecord> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &AppName) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AppName, &NormalizedRecord)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that appeared more than once in the input, in encounter order.
    pub fn duplicates(&self) -> &[AppName] {
        &self.duplicates
    }
}
