//! Pipeline error type.

use explainer_parser::ParseError;
use explainer_renderer::{AllowListError, RenderError};
use explainer_storage::StoreError;

/// Error aborting one document's pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("language allow-list error: {0}")]
    AllowList(#[from] AllowListError),

    /// Every generated id was already taken.
    #[error("no free id after {attempts} attempts: {source}")]
    IdExhausted {
        attempts: usize,
        #[source]
        source: StoreError,
    },
}
