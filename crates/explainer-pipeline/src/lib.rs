//! End-to-end explainer pipeline.
//!
//! Raw markdown flows through [`explainer_parser`] and
//! [`explainer_renderer`], receives an id from [`explainer_id`] and is
//! persisted in an [`explainer_storage::DocumentStore`]. The [`Pipeline`]
//! owns the read-only pieces (parser, renderer, allow-list) and the store,
//! and carries the retry policy for id collisions.

mod error;
mod pipeline;

pub use error::PipelineError;
pub use pipeline::{Created, MAX_PUT_ATTEMPTS, Pipeline, compose_markdown};
