//! Renderer for parsed annotated-code documents.
//!
//! Converts an [`explainer_parser::Document`] into a [`RenderResult`]:
//! prose and annotation bodies go through a plain CommonMark transform,
//! code blocks are syntax highlighted line by line, and every code block
//! language is normalized against a [`LanguageAllowList`].
//!
//! # Architecture
//!
//! - [`Renderer`]: walks the document in order and assembles rendered blocks
//! - [`Highlighter`]: pluggable line highlighter ([`SyntectHighlighter`],
//!   [`PlainHighlighter`])
//! - [`markdown_to_html`]: escaping CommonMark renderer built on pulldown-cmark
//!
//! # Example
//!
//! ```
//! use explainer_parser::parse;
//! use explainer_renderer::{LanguageAllowList, Renderer};
//!
//! let doc = parse("# Demo\n```python\nx = 1\n```\n[[annotation: line 1]]\nSets x.\n").unwrap();
//! let result = Renderer::new().render(&doc, &LanguageAllowList::default()).unwrap();
//! let rendered = result.into_document("demo-0123456789ab");
//!
//! assert_eq!(rendered.title, "Demo");
//! assert_eq!(rendered.code_blocks().count(), 1);
//! ```

mod allow_list;
mod error;
mod highlight;
mod markup;
mod output;
mod renderer;

pub use allow_list::{DEFAULT_FALLBACK, LanguageAllowList, LanguageInfo};
pub use error::{AllowListError, HighlightError, RenderError};
pub use highlight::{DEFAULT_THEME, Highlighter, PlainHighlighter, SyntectHighlighter};
pub use markup::{escape_html, markdown_to_html};
pub use output::{
    RenderResult, RenderWarning, RenderedAnnotation, RenderedBlock, RenderedCode,
    RenderedDocument,
};
pub use renderer::Renderer;
