//! Document Store: open / persist / copy documents by id.
//!
//! Every mutation goes through [`with_document`]: take the per-document lock, open,
//! edit, persist, release. That framing is the only concurrency boundary; two
//! operations on the same document never interleave, and nothing spans documents.

pub mod fs;
pub mod memory;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::document::Document;

pub use fs::FsStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document '{id}' is not accessible: {reason}")]
    Inaccessible { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the id itself is bad (missing or unreachable), as opposed to a
    /// transient storage failure.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Inaccessible { .. })
    }
}

/// What callers get back about a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
    pub url: String,
}

pub trait DocumentStore: Send + Sync {
    fn open(&self, id: &str) -> Result<Document, StoreError>;

    /// Writes the document under its own id, creating it if absent.
    fn persist(&self, document: &Document) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<DocumentRef>, StoreError>;

    fn url_for(&self, id: &str) -> String;

    fn locks(&self) -> &DocumentLocks;

    fn reference(&self, document: &Document) -> DocumentRef {
        DocumentRef {
            id: document.id.clone(),
            name: document.name.clone(),
            url: self.url_for(&document.id),
        }
    }

    /// Copies `source_id` into a new document named `new_name`.
    fn copy(
        &self,
        source_id: &str,
        new_name: &str,
        folder: Option<&str>,
    ) -> Result<DocumentRef, StoreError> {
        let mut document = self.open(source_id)?;
        document.id = Uuid::new_v4().to_string();
        document.name = new_name.to_string();
        document.folder = folder.map(str::to_string);
        document.modified_at = Utc::now();
        self.persist(&document)?;
        debug!(source = source_id, copy = %document.id, "Copied document");
        Ok(self.reference(&document))
    }
}

/// Per-document mutexes, created on first use and dropped when the last holder
/// or waiter releases them.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    /// Runs `f` while holding the lock for `id`.
    pub fn with_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let checkout = Checkout {
            owner: self,
            id,
            lock: Some(self.registry().entry(id.to_string()).or_default().clone()),
        };
        let _held = checkout
            .lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));
        f()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.registry().len()
    }
}

/// Hands a per-document lock back to the registry, removing the entry when nobody
/// else holds a reference to it.
struct Checkout<'a> {
    owner: &'a DocumentLocks,
    id: &'a str,
    lock: Option<Arc<Mutex<()>>>,
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.registry();
        self.lock.take();
        if locks.get(self.id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(self.id);
        }
    }
}

/// Opens `id`, runs `edit`, and persists the result if anything changed, holding the
/// document's lock throughout.
pub fn with_document<T>(
    store: &dyn DocumentStore,
    id: &str,
    edit: impl FnOnce(&mut Document) -> T,
) -> Result<T, StoreError> {
    store.locks().with_lock(id, || {
        let mut document = store.open(id)?;
        let before = document.clone();
        let outcome = edit(&mut document);
        if document != before {
            document.modified_at = Utc::now();
            store.persist(&document)?;
        }
        Ok(outcome)
    })
}

/// Opens `id` for reading under its lock, so readers never see a half-written edit.
pub fn read_document(store: &dyn DocumentStore, id: &str) -> Result<Document, StoreError> {
    store.locks().with_lock(id, || store.open(id))
}
