use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::document::Document;
use crate::store::{DocumentLocks, DocumentRef, DocumentStore, StoreError};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Document>>,
    locks: DocumentLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn open(&self, id: &str) -> Result<Document, StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<DocumentRef>, StoreError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.values().map(|d| self.reference(d)).collect())
    }

    fn url_for(&self, id: &str) -> String {
        format!("memory://documents/{id}")
    }

    fn locks(&self) -> &DocumentLocks {
        &self.locks
    }
}
