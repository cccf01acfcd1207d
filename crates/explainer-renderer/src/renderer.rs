//! Document renderer.

use explainer_parser::{AnnotatedCodeBlock, Block, Document};

use crate::allow_list::LanguageAllowList;
use crate::error::RenderError;
use crate::highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
use crate::markup::markdown_to_html;
use crate::output::{RenderResult, RenderWarning, RenderedAnnotation, RenderedBlock, RenderedCode};

/// Renders parsed documents into highlighted, embeddable markup.
///
/// The renderer holds only its highlighter; the allow-list is passed per
/// call, so one renderer can serve concurrent renders with different lists.
///
/// # Example
///
/// ```
/// use explainer_parser::parse;
/// use explainer_renderer::{LanguageAllowList, PlainHighlighter, Renderer};
///
/// let doc = parse("```cobol\nDISPLAY 'HI'.\n```\n").unwrap();
/// let list = LanguageAllowList::new(["python"], "text").unwrap();
/// let result = Renderer::with_highlighter(PlainHighlighter).render(&doc, &list).unwrap();
///
/// assert_eq!(result.warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Renderer<H = SyntectHighlighter> {
    highlighter: H,
}

impl Renderer<SyntectHighlighter> {
    /// Create a renderer with syntect highlighting and the default theme.
    #[must_use]
    pub fn new() -> Self {
        Self {
            highlighter: SyntectHighlighter::new(),
        }
    }
}

impl<H: Highlighter> Renderer<H> {
    /// Create a renderer with a custom highlighter.
    #[must_use]
    pub fn with_highlighter(highlighter: H) -> Self {
        Self { highlighter }
    }

    /// Render `doc`, normalizing languages against `allow_list`.
    ///
    /// Unknown languages never fail the render: they become the fallback tag
    /// with an [`RenderWarning::UnknownLanguage`] warning. Fails only when
    /// the document has no blocks.
    pub fn render(
        &self,
        doc: &Document,
        allow_list: &LanguageAllowList,
    ) -> Result<RenderResult, RenderError> {
        if doc.blocks.is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        let mut warnings = Vec::new();
        let blocks = doc
            .blocks
            .iter()
            .map(|block| match block {
                Block::Prose(prose) => RenderedBlock::Prose {
                    html: markdown_to_html(&prose.markdown),
                },
                Block::Code(code) => {
                    RenderedBlock::Code(self.render_code(code, allow_list, &mut warnings))
                }
            })
            .collect();

        tracing::debug!(
            blocks = doc.blocks.len(),
            warnings = warnings.len(),
            "rendered document"
        );

        Ok(RenderResult {
            title: doc.title.clone(),
            blocks,
            warnings,
        })
    }

    fn render_code(
        &self,
        code: &AnnotatedCodeBlock,
        allow_list: &LanguageAllowList,
        warnings: &mut Vec<RenderWarning>,
    ) -> RenderedCode {
        let language = normalize_language(&code.language, allow_list, warnings);
        let lines = self.highlight_lines(&language, &code.source_lines, warnings);

        let annotations = code
            .annotations
            .iter()
            .map(|annotation| RenderedAnnotation {
                range: annotation.target,
                order: annotation.order,
                html: markdown_to_html(&annotation.body),
            })
            .collect();

        RenderedCode {
            language,
            lines,
            source_lines: code.source_lines.clone(),
            annotations,
        }
    }

    /// Highlight lines, degrading to escaped plain lines on failure.
    fn highlight_lines(
        &self,
        language: &str,
        source_lines: &[String],
        warnings: &mut Vec<RenderWarning>,
    ) -> Vec<String> {
        let failure = match self.highlighter.highlight(language, source_lines) {
            Ok(lines) if lines.len() == source_lines.len() => return lines,
            Ok(lines) => format!(
                "highlighter returned {} lines for {} source lines",
                lines.len(),
                source_lines.len()
            ),
            Err(err) => err.reason,
        };

        tracing::warn!(language, reason = %failure, "highlighting failed, emitting plain lines");
        warnings.push(RenderWarning::HighlightFailed {
            language: language.to_owned(),
            reason: failure,
        });
        PlainHighlighter
            .highlight(language, source_lines)
            .unwrap_or_default()
    }
}

/// Map a fence language to an allow-listed tag.
///
/// A missing language maps to the fallback silently; an unknown one also
/// records a warning carrying the original tag.
fn normalize_language(
    language: &str,
    allow_list: &LanguageAllowList,
    warnings: &mut Vec<RenderWarning>,
) -> String {
    if language.is_empty() {
        return allow_list.fallback().to_owned();
    }
    if let Some(tag) = allow_list.resolve(language) {
        return tag.to_owned();
    }

    tracing::warn!(language, fallback = allow_list.fallback(), "unknown code block language");
    warnings.push(RenderWarning::UnknownLanguage {
        original: language.to_owned(),
    });
    allow_list.fallback().to_owned()
}
