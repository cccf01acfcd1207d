//! Filesystem store: one JSON file per document.
//!
//! Documents are written to a temporary file in the store directory and
//! linked into place without clobbering, so readers never observe a partial
//! file and concurrent puts for one id cannot both succeed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use explainer_renderer::RenderedDocument;
use tempfile::NamedTempFile;

use crate::store::{
    DocumentStore, StoreError, StoreErrorKind, StoreOperation, check_put, validate_id,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

const EXTENSION: &str = "json";

/// Store keeping `{id}.json` files in one directory.
///
/// The directory is created on first `put`; a missing directory lists as
/// empty.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    fn write_temp(&self, id: &str, json: &[u8]) -> Result<NamedTempFile, StoreError> {
        let io_err = |e: std::io::Error| {
            StoreError::new(StoreErrorKind::Io, StoreOperation::Put)
                .with_id(id)
                .with_backend(BACKEND)
                .with_source(e)
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp.write_all(json).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        Ok(temp)
    }
}

impl DocumentStore for FsStore {
    fn put(&self, id: &str, doc: &RenderedDocument) -> Result<(), StoreError> {
        check_put(id, doc).map_err(|e| e.with_backend(BACKEND))?;

        let json = serde_json::to_vec_pretty(doc).map_err(|e| {
            StoreError::new(StoreErrorKind::Corrupt, StoreOperation::Put)
                .with_id(id)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        let path = self.document_path(id);
        if path.exists() {
            return Err(StoreError::already_exists(id).with_backend(BACKEND));
        }

        let temp = self.write_temp(id, &json)?;
        temp.persist_noclobber(&path).map_err(|e| {
            StoreError::io(e.error, StoreOperation::Put)
                .with_id(id)
                .with_backend(BACKEND)
        })?;

        tracing::info!(id, path = %path.display(), "stored explainer");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<RenderedDocument, StoreError> {
        validate_id(id, StoreOperation::Get).map_err(|e| e.with_backend(BACKEND))?;

        let path = self.document_path(id);
        let json = fs::read(&path).map_err(|e| {
            StoreError::io(e, StoreOperation::Get)
                .with_id(id)
                .with_backend(BACKEND)
        })?;

        let doc: RenderedDocument = serde_json::from_slice(&json).map_err(|e| {
            StoreError::new(StoreErrorKind::Corrupt, StoreOperation::Get)
                .with_id(id)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        if doc.id != id {
            tracing::warn!(id, stored_id = %doc.id, "stored document id does not match file name");
            return Err(StoreError::new(StoreErrorKind::Corrupt, StoreOperation::Get)
                .with_id(id)
                .with_backend(BACKEND));
        }
        Ok(doc)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::io(e, StoreOperation::List).with_backend(BACKEND));
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StoreError::io(e, StoreOperation::List).with_backend(BACKEND))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_id(id, StoreOperation::List).is_ok() {
                ids.push(id.to_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> bool {
        validate_id(id, StoreOperation::Get).is_ok() && self.document_path(id).is_file()
    }
}
