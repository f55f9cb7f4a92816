use std::collections::{BTreeMap, BTreeSet};

use folio_types::{DocumentId, FieldValue, LocalizedMap, RevisionId, RevisionTag};

/// Everything the caller supplies when writing a revision.
///
/// The store assigns the revision id, timestamp and `previous` link.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRevision {
    pub document: DocumentId,
    pub user: Option<String>,
    pub tags: BTreeSet<RevisionTag>,
    pub summary: Option<LocalizedMap>,
    pub deleted: bool,
    pub fields: BTreeMap<String, FieldValue>,
    /// Optimistic concurrency guard: the write only lands if this is still
    /// the document's current revision.
    pub expected_current: Option<RevisionId>,
}

impl NewRevision {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            user: None,
            tags: BTreeSet::new(),
            summary: None,
            deleted: false,
            fields: BTreeMap::new(),
            expected_current: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_tag(mut self, tag: RevisionTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_summary(mut self, summary: LocalizedMap) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, FieldValue>) -> Self {
        self.fields = fields;
        self
    }

    pub fn tombstone(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn expecting(mut self, current: RevisionId) -> Self {
        self.expected_current = Some(current);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let doc = DocumentId::new();
        let base = RevisionId::new();
        let draft = NewRevision::new(doc)
            .with_user("ada")
            .with_tag(RevisionTag::Update)
            .with_field("body", "text")
            .expecting(base);
        assert_eq!(draft.document, doc);
        assert_eq!(draft.user.as_deref(), Some("ada"));
        assert!(draft.tags.contains(&RevisionTag::Update));
        assert_eq!(draft.fields.get("body"), Some(&FieldValue::text("text")));
        assert_eq!(draft.expected_current, Some(base));
        assert!(!draft.deleted);
    }
}
