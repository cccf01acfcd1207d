//! Parser for annotated-code markdown explainers.
//!
//! Turns free-form markdown, typically produced by an LLM asked to annotate
//! code, into a structured [`Document`]: prose blocks interleaved with fenced
//! code blocks, each carrying ordered annotations bound to line ranges.
//!
//! # Architecture
//!
//! The input is scanned line by line. Fence lines are tracked so that
//! anything inside a code block is literal code. Every other line is offered
//! to an [`AnnotationGrammar`]; recognized directives open an annotation
//! bound to the most recent code block, and the lines that follow become its
//! body until the next directive, fence or heading. Everything else is prose.
//!
//! # Example
//!
//! ```
//! use explainer_parser::{AnnotationParser, HtmlCommentGrammar};
//!
//! let markdown = "# Demo\n\n```rust\nlet x = 1;\n```\n<!-- annotation: lines 1-1 -->\nBinds x.\n";
//! let doc = AnnotationParser::with_grammar(HtmlCommentGrammar)
//!     .parse(markdown)
//!     .unwrap();
//!
//! assert_eq!(doc.title, "Demo");
//! assert_eq!(doc.code_blocks().next().unwrap().annotations.len(), 1);
//! ```

mod error;
mod fence;
mod grammar;
mod model;
mod parser;

pub use error::ParseError;
pub use grammar::{
    AnnotationGrammar, BracketGrammar, Directive, DirectiveContext, DirectiveError,
    HtmlCommentGrammar, parse_range_spec,
};
pub use model::{AnnotatedCodeBlock, Annotation, Block, Document, LineRange, ProseBlock};
pub use parser::{AnnotationParser, parse};
