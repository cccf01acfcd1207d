//! Rendered explainer types.
//!
//! These are the unit of persistence: they serialize to JSON and are never
//! patched after creation.

use std::fmt;

use explainer_parser::LineRange;
use serde::{Deserialize, Serialize};

/// Rendered, identified explainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub id: String,
    pub title: String,
    pub blocks: Vec<RenderedBlock>,
}

impl RenderedDocument {
    /// Iterate over the rendered code blocks.
    pub fn code_blocks(&self) -> impl Iterator<Item = &RenderedCode> {
        self.blocks.iter().filter_map(|block| match block {
            RenderedBlock::Code(code) => Some(code),
            RenderedBlock::Prose { .. } => None,
        })
    }
}

/// A rendered top-level block, in the document's reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedBlock {
    Prose { html: String },
    Code(RenderedCode),
}

/// Highlighted code block with its callouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedCode {
    /// Allow-listed language tag.
    pub language: String,
    /// Highlighted markup, one entry per source line.
    pub lines: Vec<String>,
    /// Unmodified source lines.
    pub source_lines: Vec<String>,
    pub annotations: Vec<RenderedAnnotation>,
}

/// Annotation callout with its body rendered to HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedAnnotation {
    pub range: LineRange,
    pub order: usize,
    pub html: String,
}

/// Non-fatal condition recorded while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderWarning {
    /// Language outside the allow-list, replaced by the fallback tag.
    UnknownLanguage { original: String },
    /// Highlighter failed; the block was emitted unhighlighted.
    HighlightFailed { language: String, reason: String },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLanguage { original } => {
                write!(f, "unknown language {original:?}, rendered as fallback")
            }
            Self::HighlightFailed { language, reason } => {
                write!(f, "highlighting {language} failed: {reason}")
            }
        }
    }
}

/// Output of one render: the document body plus accumulated warnings.
///
/// The id is assigned afterwards with [`into_document`](Self::into_document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub title: String,
    pub blocks: Vec<RenderedBlock>,
    pub warnings: Vec<RenderWarning>,
}

impl RenderResult {
    /// Attach an id, producing the persistable document.
    #[must_use]
    pub fn into_document(self, id: impl Into<String>) -> RenderedDocument {
        RenderedDocument {
            id: id.into(),
            title: self.title,
            blocks: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> RenderedDocument {
        RenderedDocument {
            id: "demo-abc".to_owned(),
            title: "Demo".to_owned(),
            blocks: vec![
                RenderedBlock::Prose {
                    html: "<p>Intro</p>".to_owned(),
                },
                RenderedBlock::Code(RenderedCode {
                    language: "python".to_owned(),
                    lines: vec!["x = 1".to_owned()],
                    source_lines: vec!["x = 1".to_owned()],
                    annotations: vec![RenderedAnnotation {
                        range: LineRange::new(1, 1).unwrap(),
                        order: 1,
                        html: "<p>Sets x.</p>".to_owned(),
                    }],
                }),
            ],
        }
    }

    #[test]
    fn test_block_json_shape() {
        let json = serde_json::to_value(&sample()).unwrap();
        assert_eq!(json["blocks"][0]["kind"], "prose");
        assert_eq!(json["blocks"][1]["kind"], "code");
        assert_eq!(json["blocks"][1]["annotations"][0]["range"]["start"], 1);
    }

    #[test]
    fn test_json_round_trip() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(serde_json::from_str::<RenderedDocument>(&json).unwrap(), doc);
    }

    #[test]
    fn test_code_blocks() {
        assert_eq!(sample().code_blocks().count(), 1);
    }

    #[test]
    fn test_warning_display() {
        let warning = RenderWarning::UnknownLanguage {
            original: "cobol".to_owned(),
        };
        assert_eq!(
            warning.to_string(),
            r#"unknown language "cobol", rendered as fallback"#
        );
    }

    #[test]
    fn test_into_document() {
        let result = RenderResult {
            title: "T".to_owned(),
            blocks: Vec::new(),
            warnings: vec![RenderWarning::UnknownLanguage {
                original: "x".to_owned(),
            }],
        };
        let doc = result.into_document("t-123");
        assert_eq!(doc.id, "t-123");
        assert_eq!(doc.title, "T");
    }
}
