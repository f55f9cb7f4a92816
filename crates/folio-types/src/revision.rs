use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::FieldValue;
use crate::identity::{DocumentId, RevisionId};
use crate::localized::LocalizedMap;
use crate::tag::RevisionTag;

/// One immutable, timestamped snapshot of a document.
///
/// Revisions form a singly-linked chain through `previous`. The chain can
/// also be reconstructed by ordering on `(timestamp, id)`, which is what
/// [`Revision::chain_key`] exposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub document: DocumentId,
    #[serde(default)]
    pub previous: Option<RevisionId>,
    pub timestamp: DateTime<Utc>,
    /// Acting user; `None` for system edits.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<RevisionTag>,
    #[serde(default)]
    pub summary: Option<LocalizedMap>,
    /// Tombstone flag.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Revision {
    /// Value of a field, if the revision stores one.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn has_tag(&self, tag: &RevisionTag) -> bool {
        self.tags.contains(tag)
    }

    /// `true` if any `agent:`/`agent_version:` tag is present.
    pub fn is_agent_edit(&self) -> bool {
        self.tags.iter().any(RevisionTag::is_agent)
    }

    /// Name from the first `agent:<name>` tag.
    pub fn agent_name(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            RevisionTag::Agent(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Sort key used to reconstruct the revision chain.
    pub fn chain_key(&self) -> (DateTime<Utc>, RevisionId) {
        (self.timestamp, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn revision(tags: &[RevisionTag]) -> Revision {
        Revision {
            id: RevisionId::new(),
            document: DocumentId::new(),
            previous: None,
            timestamp: Utc::now(),
            user: Some("ada".into()),
            tags: tags.iter().cloned().collect(),
            summary: None,
            deleted: false,
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn agent_detection() {
        let rev = revision(&[
            RevisionTag::Update,
            RevisionTag::Agent("fact-checker".into()),
            RevisionTag::AgentVersion("3".into()),
        ]);
        assert!(rev.is_agent_edit());
        assert_eq!(rev.agent_name(), Some("fact-checker"));

        let human = revision(&[RevisionTag::Update]);
        assert!(!human.is_agent_edit());
        assert_eq!(human.agent_name(), None);
    }

    #[test]
    fn chain_key_breaks_timestamp_ties_by_id() {
        let mut a = revision(&[]);
        let mut b = revision(&[]);
        b.timestamp = a.timestamp;
        if a.id > b.id {
            std::mem::swap(&mut a, &mut b);
        }
        assert!(a.chain_key() < b.chain_key());
    }

    #[test]
    fn deserializes_with_defaults() {
        let id = RevisionId::new();
        let doc = DocumentId::new();
        let rev: Revision = serde_json::from_value(json!({
            "id": id,
            "document": doc,
            "timestamp": "2024-03-01T12:00:00Z",
            "fields": {"title": {"en": "Title"}, "rating": 4}
        }))
        .unwrap();
        assert_eq!(rev.id, id);
        assert!(rev.tags.is_empty());
        assert!(!rev.deleted);
        assert!(rev.field("title").and_then(FieldValue::as_localized).is_some());
        assert_eq!(rev.field("rating"), Some(&FieldValue::Json(json!(4))));
    }
}
