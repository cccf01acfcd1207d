//! Store trait and error types.
//!
//! Ids form a flat namespace. A stored document is immutable: `put` never
//! overwrites, and regenerating an explainer means storing it under a new id.

use std::fmt;

use explainer_renderer::RenderedDocument;
use serde::{Deserialize, Serialize};

/// Longest accepted id, leaving room for a file extension.
pub const MAX_ID_LEN: usize = 200;

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// No document is stored under the id.
    NotFound,
    /// A document is already stored under the id.
    AlreadyExists,
    /// The id is empty, too long or contains unsupported characters.
    InvalidId,
    /// Underlying storage failed.
    Io,
    /// Stored data cannot be decoded.
    Corrupt,
}

/// Store operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Put,
    Get,
    List,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Put => "put",
            Self::Get => "get",
            Self::List => "list",
        })
    }
}

/// Store error with semantic kind, operation context and backend source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Operation that failed.
    pub operation: StoreOperation,
    /// Id context (if applicable).
    pub id: Option<String>,
    /// Backend identifier (e.g., "Fs", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind, operation: StoreOperation) -> Self {
        Self {
            kind,
            operation,
            id: None,
            backend: None,
            source: None,
        }
    }

    /// Attach id context.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for `id`.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, StoreOperation::Get).with_id(id)
    }

    /// Create an already exists error for `id`.
    #[must_use]
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::AlreadyExists, StoreOperation::Put).with_id(id)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, operation: StoreOperation) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => StoreErrorKind::AlreadyExists,
            _ => StoreErrorKind::Io,
        };
        Self::new(kind, operation).with_source(err)
    }

    /// Whether the error is a collision the caller may resolve with a new id.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.kind == StoreErrorKind::AlreadyExists
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "[Backend] op: Kind: message (id: foo)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::AlreadyExists => "Already exists",
            StoreErrorKind::InvalidId => "Invalid id",
            StoreErrorKind::Io => "I/O failure",
            StoreErrorKind::Corrupt => "Corrupt document",
        };

        write!(f, "{}: {kind_str}", self.operation)?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(id) = &self.id {
            write!(f, " (id: {id})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Listing entry with a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    /// Id with hyphens shown as spaces.
    pub name: String,
}

impl DocumentSummary {
    #[must_use]
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = id.split('-').collect::<Vec<_>>().join(" ");
        Self { id, name }
    }
}

/// Persistence of rendered explainers by id.
///
/// Implementations must make `put` atomic per document: a concurrent `get`
/// sees either nothing or the whole document. Two concurrent `put`s for the
/// same id resolve to exactly one success and one
/// [`StoreErrorKind::AlreadyExists`]. Stores never retry on their own.
pub trait DocumentStore: Send + Sync {
    /// Store `doc` under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::AlreadyExists`] if `id` is taken and
    /// [`StoreErrorKind::InvalidId`] if `id` is malformed or differs from
    /// `doc.id`.
    fn put(&self, id: &str, doc: &RenderedDocument) -> Result<(), StoreError>;

    /// Retrieve the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::NotFound`] if nothing is stored under `id`.
    fn get(&self, id: &str) -> Result<RenderedDocument, StoreError>;

    /// All stored ids.
    ///
    /// Order is stable within one call only; sort for presentation.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Check whether a document is stored under `id`.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, id: &str) -> bool;

    /// Stored ids with display names, sorted by id.
    fn summaries(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        let mut ids = self.list()?;
        ids.sort();
        Ok(ids.into_iter().map(DocumentSummary::from_id).collect())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn put(&self, id: &str, doc: &RenderedDocument) -> Result<(), StoreError> {
        (**self).put(id, doc)
    }

    fn get(&self, id: &str) -> Result<RenderedDocument, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        (**self).list()
    }

    fn exists(&self, id: &str) -> bool {
        (**self).exists(id)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn put(&self, id: &str, doc: &RenderedDocument) -> Result<(), StoreError> {
        (**self).put(id, doc)
    }

    fn get(&self, id: &str) -> Result<RenderedDocument, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        (**self).list()
    }

    fn exists(&self, id: &str) -> bool {
        (**self).exists(id)
    }
}

/// Check that `id` is usable as a flat key: 1 to [`MAX_ID_LEN`] characters
/// of lowercase ASCII letters, digits, `-` or `_`, not starting with `-`.
pub fn validate_id(id: &str, operation: StoreOperation) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && !id.starts_with('-')
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::new(StoreErrorKind::InvalidId, operation).with_id(id))
    }
}

/// Validate `id` for a put and check it matches the document's own id.
pub(crate) fn check_put(id: &str, doc: &RenderedDocument) -> Result<(), StoreError> {
    validate_id(id, StoreOperation::Put)?;
    if doc.id != id {
        return Err(
            StoreError::new(StoreErrorKind::InvalidId, StoreOperation::Put)
                .with_id(id)
                .with_source(IdMismatch {
                    document_id: doc.id.clone(),
                }),
        );
    }
    Ok(())
}

/// Put id that differs from the document's id.
#[derive(Debug)]
struct IdMismatch {
    document_id: String,
}

impl fmt::Display for IdMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document carries id {:?}", self.document_id)
    }
}

impl std::error::Error for IdMismatch {}
