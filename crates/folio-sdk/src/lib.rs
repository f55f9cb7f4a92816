//! High-level SDK for Folio.
//!
//! Ties the revision store, the diff engine and the patch engine together
//! behind one entry point, [`Folio`]. Embedders register a
//! [`DocumentSchema`] per document kind, then create documents, compare
//! revisions, walk history and let agents edit text fields through patches.

pub mod edit;
pub mod error;
pub mod repository;

pub use edit::{EditOutcome, EditRequest};
pub use error::{SdkError, SdkResult};
pub use repository::{Folio, HistoryEntry};

// Re-export key types
pub use folio_diff::{ChangeReport, FieldDiff};
pub use folio_patch::{PatchDialect, PatchError, PatchErrorKind};
pub use folio_store::{InMemoryRevisionStore, RevisionStore};
pub use folio_types::{DocumentId, DocumentSchema, FieldKind, FieldValue, Revision, RevisionId, RevisionTag};
