//! In-memory store.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{PoisonError, RwLock};

use explainer_renderer::RenderedDocument;

use crate::store::{
    DocumentStore, StoreError, StoreErrorKind, StoreOperation, check_put, validate_id,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Memory";

/// Store keeping documents in a map behind a lock.
///
/// A poisoned lock is recovered: each write is a single map insert, so the
/// map is never left half-updated by a panicking writer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, RenderedDocument>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn put(&self, id: &str, doc: &RenderedDocument) -> Result<(), StoreError> {
        check_put(id, doc).map_err(|e| e.with_backend(BACKEND))?;

        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match documents.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::already_exists(id).with_backend(BACKEND)),
            Entry::Vacant(slot) => {
                slot.insert(doc.clone());
                tracing::debug!(id, "stored explainer in memory");
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<RenderedDocument, StoreError> {
        validate_id(id, StoreOperation::Get).map_err(|e| e.with_backend(BACKEND))?;
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::NotFound, StoreOperation::Get)
                    .with_id(id)
                    .with_backend(BACKEND)
            })
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }

    fn exists(&self, id: &str) -> bool {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}
