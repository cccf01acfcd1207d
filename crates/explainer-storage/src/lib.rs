//! Persistence of rendered explainers.
//!
//! This crate provides the [`DocumentStore`] trait with two backends:
//!
//! - [`FsStore`]: one JSON file per document, written atomically
//! - [`MemoryStore`]: lock-protected map, for tests and embedding
//!
//! # Example
//!
//! ```
//! use explainer_renderer::RenderedDocument;
//! use explainer_storage::{DocumentStore, MemoryStore, StoreErrorKind};
//!
//! let store = MemoryStore::new();
//! let doc = RenderedDocument {
//!     id: "demo-1".to_owned(),
//!     title: "Demo".to_owned(),
//!     blocks: vec![],
//! };
//!
//! store.put("demo-1", &doc).unwrap();
//! assert_eq!(store.put("demo-1", &doc).unwrap_err().kind, StoreErrorKind::AlreadyExists);
//! assert_eq!(store.get("demo-1").unwrap(), doc);
//! ```

mod fs;
mod memory;
mod store;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use store::{
    DocumentStore, DocumentSummary, MAX_ID_LEN, StoreError, StoreErrorKind, StoreOperation,
    validate_id,
};
