//! Revision comparison: every declared field that changed between two
//! revisions of a document, in schema order.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use folio_types::{DocumentId, DocumentSchema, LocalizedMap, Revision, RevisionId, RevisionTag};

use crate::field::{diff_field, FieldDiff};

/// The result of comparing two revisions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeReport {
    pub document: DocumentId,
    /// `None` when `to` is compared against nothing (document creation).
    pub from: Option<RevisionId>,
    pub to: RevisionId,
    /// Tags, user and summary of the `to` revision.
    pub tags: BTreeSet<RevisionTag>,
    pub user: Option<String>,
    pub summary: Option<LocalizedMap>,
    pub deleted_before: bool,
    pub deleted_after: bool,
    /// One entry per changed field, in schema order.
    pub changes: Vec<FieldDiff>,
    /// Fields stored on either revision that the schema does not declare.
    /// They are not diffed.
    pub undeclared_fields: Vec<String>,
}

impl ChangeReport {
    /// Returns `true` if no field changed and the tombstone flag is unchanged.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && !self.tombstone_changed()
    }

    pub fn tombstone_changed(&self) -> bool {
        self.deleted_before != self.deleted_after
    }

    /// The diff for one field, if it changed.
    pub fn change(&self, field: &str) -> Option<&FieldDiff> {
        self.changes.iter().find(|c| c.field() == field)
    }

    /// Names of changed fields, in schema order.
    pub fn changed_fields(&self) -> Vec<&str> {
        self.changes.iter().map(FieldDiff::field).collect()
    }
}

/// Compare two revisions field by field.
///
/// - `from`: the earlier revision (or `None` to describe a creation).
/// - `to`: the later revision.
///
/// Only fields declared in `schema` are diffed, each with its declared kind.
pub fn compare_revisions(
    schema: &DocumentSchema,
    from: Option<&Revision>,
    to: &Revision,
) -> ChangeReport {
    let changes: Vec<FieldDiff> = schema
        .fields
        .iter()
        .filter_map(|spec| {
            diff_field(
                spec.kind,
                &spec.name,
                from.and_then(|r| r.field(&spec.name)),
                to.field(&spec.name),
            )
        })
        .collect();

    let undeclared_fields: Vec<String> = from
        .into_iter()
        .flat_map(|r| r.fields.keys())
        .chain(to.fields.keys())
        .filter(|name| schema.kind_of(name).is_none())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    debug!(
        document = %to.document.short_id(),
        from = ?from.map(|r| r.id),
        to = %to.id.short_id(),
        changed = changes.len(),
        undeclared = undeclared_fields.len(),
        "compared revisions"
    );

    ChangeReport {
        document: to.document,
        from: from.map(|r| r.id),
        to: to.id,
        tags: to.tags.clone(),
        user: to.user.clone(),
        summary: to.summary.clone(),
        deleted_before: from.is_some_and(|r| r.deleted),
        deleted_after: to.deleted,
        changes,
        undeclared_fields,
    }
}
