use folio_types::{DocumentId, Revision, RevisionId};

use crate::draft::NewRevision;
use crate::error::StoreResult;

/// Append-only revision store.
///
/// All implementations must satisfy these invariants:
/// - Revisions are immutable once written.
/// - Each new revision links `previous` to the revision that was current
///   when it was written, and becomes the document's only current revision.
/// - `list_revisions` orders by timestamp, then revision id.
/// - A guarded write (`expected_current`) checks and appends atomically.
pub trait RevisionStore: Send + Sync {
    /// Append a revision and return it as stored.
    fn create_revision(&self, draft: NewRevision) -> StoreResult<Revision>;

    /// All revisions of a document, oldest first.
    ///
    /// Returns an empty vec for unknown documents.
    fn list_revisions(&self, document: &DocumentId) -> StoreResult<Vec<Revision>>;

    /// Fetch one revision by id.
    ///
    /// Returns `Ok(None)` if the revision does not exist.
    fn get_revision(&self, id: &RevisionId) -> StoreResult<Option<Revision>>;

    /// The current revision of a document.
    ///
    /// Returns `Ok(None)` for unknown documents. A tombstoned document still
    /// has a current revision (with `deleted` set).
    fn current_revision(&self, document: &DocumentId) -> StoreResult<Option<Revision>> {
        Ok(self.list_revisions(document)?.pop())
    }
}
