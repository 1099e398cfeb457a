//! Document database boundary.
//!
//! Everything the tools need from the database goes through [`DocumentStore`]:
//! an equality query over one collection and an atomic commit of a list of
//! writes. [`FirestoreClient`] talks to Firestore over REST, [`MemoryStore`]
//! keeps documents in process for tests.

pub mod batch;
pub mod firestore;
pub mod memory;
pub mod value;

pub use batch::{BatchOutcome, WriteBatch};
pub use firestore::FirestoreClient;
pub use memory::MemoryStore;

use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use std::fmt;

/// Field map of a single document, in plain JSON.
pub type Fields = serde_json::Map<String, Value>;

const AUTO_ID_LEN: usize = 20;
const MAX_ID_BYTES: usize = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    name: String,
}

impl CollectionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self, id: impl Into<String>) -> Result<DocumentRef> {
        let id = id.into();
        validate_document_id(&id)?;
        Ok(DocumentRef {
            collection: self.name.clone(),
            id,
        })
    }

    /// Reference with a fresh client-generated id.
    pub fn new_doc(&self) -> DocumentRef {
        DocumentRef {
            collection: self.name.clone(),
            id: auto_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    collection: String,
    id: String,
}

impl DocumentRef {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path relative to the database root, e.g. `themes/abc123`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let (collection, id) = path.rsplit_once('/')?;
        if collection.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

pub fn validate_document_id(id: &str) -> Result<()> {
    let reserved = id.len() >= 4 && id.starts_with("__") && id.ends_with("__");
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.len() > MAX_ID_BYTES
        || reserved
    {
        return Err(CatalogError::InvalidDocumentId(id.to_string()));
    }
    Ok(())
}

pub fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create the document or replace it entirely.
    Set { doc: DocumentRef, fields: Fields },
    Delete { doc: DocumentRef },
}

impl Write {
    pub fn is_delete(&self) -> bool {
        matches!(self, Write::Delete { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub reference: DocumentRef,
    pub fields: Fields,
}

#[derive(Debug, Clone, Default)]
pub struct CommitSummary {
    pub writes: usize,
    pub commit_time: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn query(
        &self,
        collection: &CollectionRef,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>>;

    /// Applies every write or none of them.
    async fn commit(&self, writes: Vec<Write>) -> Result<CommitSummary>;
}
