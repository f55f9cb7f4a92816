use folio_types::{DocumentId, RevisionId};

/// Errors from revision store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The document has no revisions.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// The requested revision was not found.
    #[error("revision not found: {0}")]
    RevisionNotFound(RevisionId),

    /// The write was based on a revision that is no longer current.
    #[error("stale revision for document {document}: expected current {expected}, found {actual}")]
    StaleRevision {
        document: DocumentId,
        expected: RevisionId,
        actual: RevisionId,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
