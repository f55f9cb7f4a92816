use folio_types::DocumentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no schema registered for document kind: {0}")]
    UnknownSchema(String),

    #[error("document {0} has no registered kind")]
    UnknownDocument(DocumentId),

    #[error("field {field} cannot be patched: {reason}")]
    FieldNotPatchable { field: String, reason: String },

    #[error("document {0} is deleted")]
    DocumentDeleted(DocumentId),

    #[error("revisions belong to different documents: {from} and {to}")]
    DocumentMismatch { from: DocumentId, to: DocumentId },

    #[error("patch error: {0}")]
    Patch(#[from] folio_patch::PatchError),

    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),

    #[error("type error: {0}")]
    Type(#[from] folio_types::TypeError),
}

impl SdkError {
    /// Whether re-reading the document and retrying could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Patch(err) => err.is_retryable(),
            Self::Store(folio_store::StoreError::StaleRevision { .. }) => true,
            _ => false,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
