//! Diff engine for Folio.
//!
//! Compares two revisions of a document field by field, producing typed,
//! renderable diffs. Every function here is pure and total: malformed
//! stored data degrades to an opaque scalar comparison instead of failing.
//!
//! # Key Types
//!
//! - [`ScalarValue`] / [`normalize_scalar`] -- Canonical string forms for primitives and dates
//! - [`StructuredChange`] / [`diff_values`] -- Path-addressed diff of nested JSON values
//! - [`TextDiff`] / [`build_text_diff`] -- Unified diff plus line statistics
//! - [`FieldDiff`] / [`diff_field`] -- Per-field dispatch over [`FieldKind`](folio_types::FieldKind)
//! - [`ChangeReport`] / [`compare_revisions`] -- All field changes between two revisions

pub mod field;
pub mod report;
pub mod scalar;
pub mod structured;
pub mod text;

pub use field::{
    diff_field, diff_localized_field, diff_scalar_field, diff_structured_field, diff_text_field,
    touched_locales, FieldDiff, LocaleEntry, LocalizedDiff, ScalarDiff, StructuredDiff,
    TextFieldDiff,
};
pub use report::{compare_revisions, ChangeReport};
pub use scalar::{canonical_json, normalize_scalar, ScalarValue};
pub use structured::{diff_values, escape_segment, values_equal, StructuredChange};
pub use text::{build_text_diff, DiffHunk, DiffLine, TextDiff, CONTEXT_LINES};
