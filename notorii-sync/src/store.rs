//! The seam between the reconciliation core and each catalog.

use notorii_core::{AppPatch, NormalizedRecord, RemoteId};

use crate::{error::RemoteError, normalize::Normalize};

/// Full-collection read plus keyed writes against one catalog.
///
/// Implementations are constructed once per pass and passed down explicitly;
/// methods take `&mut self` so an adapter may cache per-pass lookups.
pub trait AppStore {
    /// Native record shape served by this catalog.
    type Raw: Normalize;

    /// Return the complete current set of records.
    fn fetch_all(&mut self) -> Result<Vec<Self::Raw>, RemoteError>;

    /// Create `record` in this catalog and return its new id.
    fn create(&mut self, record: &NormalizedRecord) -> Result<RemoteId, RemoteError>;

    /// Apply `patch` to the record identified by `id`.
    fn update(&mut self, id: &RemoteId, patch: &AppPatch) -> Result<(), RemoteError>;
}
