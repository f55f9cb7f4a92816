//! Revision storage for Folio.
//!
//! Persistence lives outside this workspace. This crate pins down the
//! contract the diff/patch core relies on ("create revision", "list
//! revisions", "fetch revision by id") and ships an in-memory backend used
//! by tests and embedders.
//!
//! # Storage Backends
//!
//! All backends implement the [`RevisionStore`] trait:
//!
//! - [`InMemoryRevisionStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Revisions are immutable once written.
//! 2. Exactly one revision per document is current at any time.
//! 3. A write guarded by `expected_current` either lands on that revision or
//!    fails with [`StoreError::StaleRevision`]; it never overwrites a newer one.

pub mod draft;
pub mod error;
pub mod memory;
pub mod traits;

pub use draft::NewRevision;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRevisionStore;
pub use traits::RevisionStore;
