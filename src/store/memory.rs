use crate::error::{CatalogError, Result};
use crate::store::{
    CollectionRef, CommitSummary, Document, DocumentRef, DocumentStore, FieldFilter, Fields, Write,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
    commit_attempts: usize,
    commits: usize,
    fail_on_attempt: Option<usize>,
}

/// In-process document store with the same commit semantics as the real
/// database. Backs the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, doc: &DocumentRef, fields: Fields) {
        self.state()
            .collections
            .entry(doc.collection().to_string())
            .or_default()
            .insert(doc.id().to_string(), fields);
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Fields> {
        self.state()
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.state()
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        reference: DocumentRef {
                            collection: collection.to_string(),
                            id: id.clone(),
                        },
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.state()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.state().commits
    }

    /// Makes the `attempt`-th commit call (1-based) fail without applying
    /// anything.
    pub fn fail_commit(&self, attempt: usize) {
        self.state().fail_on_attempt = Some(attempt);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: &CollectionRef,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>> {
        Ok(self
            .documents(collection.name())
            .into_iter()
            .filter(|doc| filter.matches(&doc.fields))
            .collect())
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<CommitSummary> {
        let mut state = self.state();
        state.commit_attempts += 1;
        if state.fail_on_attempt == Some(state.commit_attempts) {
            return Err(CatalogError::Api {
                status: 503,
                message: "The service is currently unavailable.".to_string(),
            });
        }

        let count = writes.len();
        for write in writes {
            match write {
                Write::Set { doc, fields } => {
                    state
                        .collections
                        .entry(doc.collection)
                        .or_default()
                        .insert(doc.id, fields);
                }
                Write::Delete { doc } => {
                    if let Some(docs) = state.collections.get_mut(&doc.collection) {
                        docs.remove(&doc.id);
                    }
                }
            }
        }
        state.commits += 1;

        Ok(CommitSummary {
            writes: count,
            commit_time: Some(chrono::Utc::now()),
        })
    }
}
