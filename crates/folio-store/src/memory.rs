use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{Duration, Utc};
use tracing::debug;

use folio_types::{DocumentId, Revision, RevisionId};

use crate::draft::NewRevision;
use crate::error::{StoreError, StoreResult};
use crate::traits::RevisionStore;

#[derive(Default)]
struct State {
    revisions: HashMap<RevisionId, Revision>,
    /// Per-document chain, oldest first.
    chains: HashMap<DocumentId, Vec<RevisionId>>,
}

/// In-memory, HashMap-based revision store.
///
/// Intended for tests and embedding. All revisions are held in memory behind
/// a `RwLock`; the concurrency guard and the append share one write lock.
pub struct InMemoryRevisionStore {
    state: RwLock<State>,
}

impl InMemoryRevisionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Number of revisions across all documents.
    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").revisions.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All documents with at least one revision, sorted.
    pub fn documents(&self) -> Vec<DocumentId> {
        let state = self.state.read().expect("lock poisoned");
        let mut ids: Vec<DocumentId> = state.chains.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryRevisionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionStore for InMemoryRevisionStore {
    fn create_revision(&self, draft: NewRevision) -> StoreResult<Revision> {
        let mut state = self.state.write().expect("lock poisoned");

        let current = state
            .chains
            .get(&draft.document)
            .and_then(|chain| chain.last())
            .and_then(|id| state.revisions.get(id));

        if let Some(expected) = draft.expected_current {
            match current {
                Some(current) if current.id == expected => {}
                Some(current) => {
                    return Err(StoreError::StaleRevision {
                        document: draft.document,
                        expected,
                        actual: current.id,
                    });
                }
                None => return Err(StoreError::DocumentNotFound(draft.document)),
            }
        }

        // Keep timestamps strictly increasing along the chain so ordering by
        // (timestamp, id) always reproduces it.
        let mut timestamp = Utc::now();
        if let Some(current) = current {
            if timestamp <= current.timestamp {
                timestamp = current.timestamp + Duration::milliseconds(1);
            }
        }

        let revision = Revision {
            id: RevisionId::new(),
            document: draft.document,
            previous: current.map(|c| c.id),
            timestamp,
            user: draft.user,
            tags: draft.tags,
            summary: draft.summary,
            deleted: draft.deleted,
            fields: draft.fields,
        };

        debug!(
            document = %revision.document.short_id(),
            revision = %revision.id.short_id(),
            deleted = revision.deleted,
            "created revision"
        );

        state
            .chains
            .entry(revision.document)
            .or_default()
            .push(revision.id);
        state.revisions.insert(revision.id, revision.clone());
        Ok(revision)
    }

    fn list_revisions(&self, document: &DocumentId) -> StoreResult<Vec<Revision>> {
        let state = self.state.read().expect("lock poisoned");
        let Some(chain) = state.chains.get(document) else {
            return Ok(Vec::new());
        };
        let mut revisions: Vec<Revision> = chain
            .iter()
            .filter_map(|id| state.revisions.get(id).cloned())
            .collect();
        revisions.sort_by_key(Revision::chain_key);
        Ok(revisions)
    }

    fn get_revision(&self, id: &RevisionId) -> StoreResult<Option<Revision>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.revisions.get(id).cloned())
    }

    fn current_revision(&self, document: &DocumentId) -> StoreResult<Option<Revision>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state
            .chains
            .get(document)
            .and_then(|chain| chain.last())
            .and_then(|id| state.revisions.get(id))
            .cloned())
    }
}

impl std::fmt::Debug for InMemoryRevisionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRevisionStore")
            .field("revision_count", &self.len())
            .finish()
    }
}
