//! Patch engine for Folio.
//!
//! Validates externally generated patches, rewrites them into one canonical
//! unified-diff form, and applies them to a field's current text with zero
//! fuzz. Two dialects are accepted:
//!
//! - [`PatchDialect::Unified`] -- standard `---`/`+++`/`@@` unified diff
//! - [`PatchDialect::Codex`] -- sectioned `*** Begin Patch` / `*** Update File:` format
//!
//! Both normalize to the same canonical text, so there is exactly one apply
//! algorithm.
//!
//! # Pipeline
//!
//! 1. [`normalize_patch`] -- dialect-specific validation and rewriting
//! 2. [`parse_unified`] -- hunks with line-tagged bodies
//! 3. [`apply_patch`] -- exact placement, all-or-nothing, rejects no-ops

pub mod apply;
pub mod dialect;
pub mod error;
pub mod hunk;
pub mod normalize;

pub use apply::{apply_parsed, apply_patch};
pub use dialect::{PatchDialect, PatchOptions};
pub use error::{PatchError, PatchErrorKind, PatchResult};
pub use hunk::{parse_hunk_header, parse_unified, Hunk, HunkHeader, LineKind, ParsedPatch, PatchLine, PatchStats};
pub use normalize::{normalize_patch, BEGIN_PATCH, END_PATCH};
