//! Foundation types for Folio.
//!
//! This crate provides the revisioned-document data model shared by the
//! diff engine, the patch engine, and the revision store. Every other Folio
//! crate depends on `folio-types`.
//!
//! # Key Types
//!
//! - [`DocumentId`] / [`RevisionId`] -- UUID identifiers (revisions are v7, time-ordered)
//! - [`Revision`] -- One immutable snapshot of a document
//! - [`RevisionTag`] -- Free-form revision tags (`create`, `agent:<name>`, ...)
//! - [`LocalizedMap`] -- Locale-keyed text supporting partial translation
//! - [`FieldValue`] -- What a revision stores for a single field
//! - [`DocumentSchema`] / [`FieldKind`] -- Caller-declared per-field diff dispatch

pub mod error;
pub mod field;
pub mod identity;
pub mod localized;
pub mod revision;
pub mod schema;
pub mod tag;

pub use error::TypeError;
pub use field::FieldValue;
pub use identity::{DocumentId, RevisionId};
pub use localized::{LocalizedMap, LocalizedUpdate};
pub use revision::Revision;
pub use schema::{DocumentSchema, FieldKind, FieldSpec};
pub use tag::RevisionTag;
