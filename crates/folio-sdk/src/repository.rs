use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use folio_diff::{compare_revisions, ChangeReport};
use folio_patch::apply_patch;
use folio_store::{InMemoryRevisionStore, NewRevision, RevisionStore, StoreError};
use folio_types::{
    DocumentId, DocumentSchema, FieldKind, FieldValue, LocalizedMap, Revision, RevisionId,
    RevisionTag,
};

use crate::edit::{EditOutcome, EditRequest};
use crate::error::{SdkError, SdkResult};

/// One revision together with what it changed relative to its predecessor.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryEntry {
    pub revision: Revision,
    pub report: ChangeReport,
}

/// High-level Folio API over a [`RevisionStore`].
pub struct Folio<S: RevisionStore> {
    store: S,
    schemas: RwLock<HashMap<String, DocumentSchema>>,
    kinds: RwLock<HashMap<DocumentId, String>>,
}

impl Folio<InMemoryRevisionStore> {
    /// A repository backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryRevisionStore::new())
    }
}

impl<S: RevisionStore> Folio<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            schemas: RwLock::new(HashMap::new()),
            kinds: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- Schemas ----

    /// Register (or replace) the schema for a document kind.
    pub fn register_schema(&self, schema: DocumentSchema) -> SdkResult<()> {
        schema.validate()?;
        debug!(kind = %schema.kind, fields = schema.fields.len(), "schema registered");
        self.schemas
            .write()
            .expect("lock poisoned")
            .insert(schema.kind.clone(), schema);
        Ok(())
    }

    pub fn schema(&self, kind: &str) -> SdkResult<DocumentSchema> {
        self.schemas
            .read()
            .expect("lock poisoned")
            .get(kind)
            .cloned()
            .ok_or_else(|| SdkError::UnknownSchema(kind.to_string()))
    }

    /// Associate a document written outside this API with a kind.
    pub fn adopt_document(&self, document: DocumentId, kind: &str) -> SdkResult<()> {
        self.schema(kind)?;
        self.kinds
            .write()
            .expect("lock poisoned")
            .insert(document, kind.to_string());
        Ok(())
    }

    pub fn schema_for(&self, document: &DocumentId) -> SdkResult<DocumentSchema> {
        let kind = self
            .kinds
            .read()
            .expect("lock poisoned")
            .get(document)
            .cloned()
            .ok_or(SdkError::UnknownDocument(*document))?;
        self.schema(&kind)
    }

    // ---- Documents ----

    /// Create a document of `kind` with its first revision.
    ///
    /// Every field must be declared by the kind's schema.
    pub fn create_document(
        &self,
        kind: &str,
        fields: BTreeMap<String, FieldValue>,
        user: Option<String>,
        tags: impl IntoIterator<Item = RevisionTag>,
    ) -> SdkResult<Revision> {
        let schema = self.schema(kind)?;
        for name in fields.keys() {
            schema.require(name)?;
        }

        let document = DocumentId::new();
        let mut draft = NewRevision::new(document)
            .with_tag(RevisionTag::Create)
            .with_fields(fields);
        draft.user = user;
        draft.tags.extend(tags);

        let revision = self.store.create_revision(draft)?;
        self.kinds
            .write()
            .expect("lock poisoned")
            .insert(document, kind.to_string());

        info!(document = %document.short_id(), kind, "document created");
        Ok(revision)
    }

    /// Write a tombstone revision. Field values are carried over unchanged.
    pub fn delete_document(&self, document: &DocumentId, user: Option<String>) -> SdkResult<Revision> {
        let current = self.current(document)?;
        if current.deleted {
            return Err(SdkError::DocumentDeleted(*document));
        }

        let mut draft = NewRevision::new(*document)
            .with_tag(RevisionTag::Delete)
            .with_fields(current.fields.clone())
            .tombstone()
            .expecting(current.id);
        draft.user = user;

        let revision = self.store.create_revision(draft)?;
        info!(document = %document.short_id(), "document deleted");
        Ok(revision)
    }

    pub fn current(&self, document: &DocumentId) -> SdkResult<Revision> {
        self.store
            .current_revision(document)?
            .ok_or_else(|| StoreError::DocumentNotFound(*document).into())
    }

    fn revision(&self, id: &RevisionId) -> SdkResult<Revision> {
        self.store
            .get_revision(id)?
            .ok_or_else(|| StoreError::RevisionNotFound(*id).into())
    }

    // ---- Comparison ----

    /// Compare two revisions of the same document.
    pub fn compare(&self, from: &RevisionId, to: &RevisionId) -> SdkResult<ChangeReport> {
        let from = self.revision(from)?;
        let to = self.revision(to)?;
        if from.document != to.document {
            return Err(SdkError::DocumentMismatch {
                from: from.document,
                to: to.document,
            });
        }
        let schema = self.schema_for(&to.document)?;
        Ok(compare_revisions(&schema, Some(&from), &to))
    }

    /// Compare a revision with the one it was written on top of.
    pub fn compare_with_previous(&self, id: &RevisionId) -> SdkResult<ChangeReport> {
        let to = self.revision(id)?;
        let from = match to.previous {
            Some(previous) => Some(self.revision(&previous)?),
            None => None,
        };
        let schema = self.schema_for(&to.document)?;
        Ok(compare_revisions(&schema, from.as_ref(), &to))
    }

    /// Every revision of a document, oldest first, each with the report
    /// against its predecessor in the chain.
    pub fn history(&self, document: &DocumentId) -> SdkResult<Vec<HistoryEntry>> {
        let schema = self.schema_for(document)?;
        let revisions = self.store.list_revisions(document)?;
        if revisions.is_empty() {
            return Err(StoreError::DocumentNotFound(*document).into());
        }

        let entries: Vec<HistoryEntry> = revisions
            .par_iter()
            .enumerate()
            .map(|(i, revision)| {
                let previous = i.checked_sub(1).map(|p| &revisions[p]);
                HistoryEntry {
                    revision: revision.clone(),
                    report: compare_revisions(&schema, previous, revision),
                }
            })
            .collect();

        debug!(document = %document.short_id(), revisions = entries.len(), "history computed");
        Ok(entries)
    }

    // ---- Edits ----

    /// Apply a patch to one text (or localized text) field and write the
    /// result as a new revision.
    ///
    /// The write is guarded on the revision that was read, so a concurrent
    /// edit in between fails with `StaleRevision` instead of being lost.
    pub fn patch_field(&self, document: &DocumentId, request: EditRequest) -> SdkResult<EditOutcome> {
        let schema = self.schema_for(document)?;
        let kind = schema.require(&request.field)?;
        let current = self.current(document)?;

        if current.deleted {
            return Err(SdkError::DocumentDeleted(*document));
        }
        if let Some(base) = request.base_revision {
            if base != current.id {
                return Err(StoreError::StaleRevision {
                    document: *document,
                    expected: base,
                    actual: current.id,
                }
                .into());
            }
        }

        let value = self.patched_value(kind, current.field(&request.field), &request)?;

        let mut draft = NewRevision::new(*document)
            .with_fields(current.fields.clone())
            .with_field(request.field.clone(), value)
            .expecting(current.id);
        draft.user = request.user.clone();
        draft.tags.extend(request.tags());

        let revision = self.store.create_revision(draft)?;
        let report = compare_revisions(&schema, Some(&current), &revision);

        info!(
            document = %document.short_id(),
            field = %request.field,
            agent = ?request.agent,
            revision = %revision.id.short_id(),
            "field patched"
        );
        Ok(EditOutcome {
            previous: current.id,
            revision,
            report,
        })
    }

    fn patched_value(
        &self,
        kind: FieldKind,
        stored: Option<&FieldValue>,
        request: &EditRequest,
    ) -> SdkResult<FieldValue> {
        let not_patchable = |reason: &str| SdkError::FieldNotPatchable {
            field: request.field.clone(),
            reason: reason.to_string(),
        };
        let options = request.patch_options();

        match kind {
            FieldKind::Text => {
                let text = match stored {
                    None => "",
                    Some(value) if value.is_null() => "",
                    Some(value) => value
                        .as_text()
                        .ok_or_else(|| not_patchable("stored value is not text"))?,
                };
                let patched = apply_patch(text, &request.patch, request.dialect, &options)?;
                Ok(FieldValue::Text(patched))
            }
            FieldKind::Localized => {
                let locale = request
                    .locale
                    .as_deref()
                    .ok_or_else(|| not_patchable("localized field needs a locale"))?;
                let mut map = match stored {
                    None => LocalizedMap::new(),
                    Some(value) if value.is_null() => LocalizedMap::new(),
                    Some(value) => value
                        .as_localized()
                        .cloned()
                        .ok_or_else(|| not_patchable("stored value is not a locale map"))?,
                };
                let text = map.get(locale).unwrap_or("");
                let patched = apply_patch(text, &request.patch, request.dialect, &options)?;
                map.insert(locale, patched);
                Ok(FieldValue::Localized(map))
            }
            FieldKind::Scalar | FieldKind::Structured => {
                Err(not_patchable("only text and localized fields accept patches"))
            }
        }
    }
}

impl<S: RevisionStore> std::fmt::Debug for Folio<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schemas = self.schemas.read().expect("lock poisoned").len();
        let documents = self.kinds.read().expect("lock poisoned").len();
        f.debug_struct("Folio")
            .field("schemas", &schemas)
            .field("documents", &documents)
            .finish()
    }
}
