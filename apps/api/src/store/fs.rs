//! File-backed store: one pretty-printed JSON file per document under a root folder.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::document::Document;
use crate::store::{DocumentLocks, DocumentRef, DocumentStore, StoreError};

#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    locks: DocumentLocks,
}

impl FsStore {
    /// Creates the root folder if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        info!("Document store rooted at {}", root.display());
        Ok(Self {
            root,
            locks: DocumentLocks::default(),
        })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Inaccessible {
                id: id.to_string(),
                reason: "document ids may only contain letters, digits, '-' and '_'".to_string(),
            });
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl DocumentStore for FsStore {
    fn open(&self, id: &str) -> Result<Document, StoreError> {
        let path = self.path_for(id)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(StoreError::Inaccessible {
                    id: id.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let document: Document = serde_json::from_slice(&bytes)?;
        if document.id != id {
            warn!(file_id = id, stored_id = %document.id, "Document id does not match file name");
            return Err(StoreError::Inaccessible {
                id: id.to_string(),
                reason: format!("file holds document '{}'", document.id),
            });
        }
        Ok(document)
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let path = self.path_for(&document.id)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<DocumentRef>, StoreError> {
        let mut refs = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.open(id) {
                Ok(document) => refs.push(self.reference(&document)),
                Err(e) => warn!("Skipping unreadable document {}: {e}", path.display()),
            }
        }
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(refs)
    }

    fn url_for(&self, id: &str) -> String {
        format!("file://{}/{id}.json", self.root.display())
    }

    fn locks(&self) -> &DocumentLocks {
        &self.locks
    }
}
