//! Per-user template registry: which stored document a user tailors from.
//!
//! References are validated on read. A reference whose document is gone or
//! unreachable is removed from settings before the error is returned.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::store::{read_document, DocumentRef, DocumentStore, StoreError};

pub const TEMPLATE_KEY: &str = "template_document_id";

/// Key/value settings scoped to a user.
pub trait SettingsStore: Send + Sync {
    fn get(&self, user: &str, key: &str) -> Option<String>;
    fn set(&self, user: &str, key: &str, value: &str);
    fn remove(&self, user: &str, key: &str);
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, user: &str, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(user.to_string(), key.to_string()))
            .cloned()
    }

    fn set(&self, user: &str, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((user.to_string(), key.to_string()), value.to_string());
    }

    fn remove(&self, user: &str, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(user.to_string(), key.to_string()));
    }
}

/// Records `document_id` as the user's template. The document must exist.
pub fn set_template(
    settings: &dyn SettingsStore,
    store: &dyn DocumentStore,
    user: &str,
    document_id: &str,
) -> Result<DocumentRef, StoreError> {
    let document = read_document(store, document_id)?;
    settings.set(user, TEMPLATE_KEY, &document.id);
    info!(user, document_id, "Template set");
    Ok(store.reference(&document))
}

/// Returns the user's template, or `None` if none is set.
pub fn resolve_template(
    settings: &dyn SettingsStore,
    store: &dyn DocumentStore,
    user: &str,
) -> Result<Option<DocumentRef>, StoreError> {
    let Some(id) = settings.get(user, TEMPLATE_KEY) else {
        return Ok(None);
    };
    match read_document(store, &id) {
        Ok(document) => Ok(Some(store.reference(&document))),
        Err(e) if e.is_stale_reference() => {
            warn!(user, document_id = %id, "Removing stale template reference: {e}");
            settings.remove(user, TEMPLATE_KEY);
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::store::MemoryStore;

    #[test]
    fn test_set_then_resolve_template() {
        let settings = MemorySettings::new();
        let store = MemoryStore::new();
        store.persist(&Document::new("base", "Base resume")).unwrap();

        set_template(&settings, &store, "ana", "base").unwrap();
        let template = resolve_template(&settings, &store, "ana").unwrap().unwrap();
        assert_eq!(template.id, "base");
        assert_eq!(template.name, "Base resume");
        assert_eq!(resolve_template(&settings, &store, "ben").unwrap(), None);
    }

    #[test]
    fn test_set_template_rejects_missing_document() {
        let settings = MemorySettings::new();
        let store = MemoryStore::new();
        assert!(set_template(&settings, &store, "ana", "ghost").is_err());
        assert_eq!(settings.get("ana", TEMPLATE_KEY), None);
    }

    #[test]
    fn test_stale_reference_is_removed_on_read() {
        let settings = MemorySettings::new();
        let store = MemoryStore::new();
        settings.set("ana", TEMPLATE_KEY, "deleted-doc");

        let err = resolve_template(&settings, &store, "ana").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(settings.get("ana", TEMPLATE_KEY), None);
        assert_eq!(resolve_template(&settings, &store, "ana").unwrap(), None);
    }
}
