//! Render and allow-list error types.

use std::path::PathBuf;

/// Error rendering a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The document has no blocks; an empty explainer is invalid output.
    #[error("document has no blocks to render")]
    EmptyDocument,

    /// Configured highlighting theme does not exist.
    #[error("unknown highlighting theme: {0}")]
    UnknownTheme(String),
}

/// Failure of a [`Highlighter`](crate::Highlighter) on one code block.
///
/// The renderer recovers from it by emitting escaped, unhighlighted lines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("highlighting {language} failed: {reason}")]
pub struct HighlightError {
    pub language: String,
    pub reason: String,
}

/// Error loading a language allow-list.
#[derive(Debug, thiserror::Error)]
pub enum AllowListError {
    /// Allow-list file could not be read.
    #[error("failed to read language list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Allow-list YAML is malformed.
    #[error("invalid language list: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Fallback tag is empty or contains whitespace.
    #[error("invalid fallback language tag: {0:?}")]
    InvalidFallback(String),
}
