//! Line-based annotated markdown parser.

use crate::error::ParseError;
use crate::fence::{FenceLine, FenceTracker, OpenFence};
use crate::grammar::{AnnotationGrammar, BracketGrammar, Directive, DirectiveContext};
use crate::model::{AnnotatedCodeBlock, Annotation, Block, Document, LineRange, ProseBlock};

/// Parse annotated markdown with the default [`BracketGrammar`].
///
/// # Example
///
/// ```
/// use explainer_parser::{Block, parse};
///
/// let doc = parse("```python\nx = 1\n```\n[[annotation: lines 1-1]]\nSets x.\n").unwrap();
/// let Block::Code(code) = &doc.blocks[0] else { panic!("expected code") };
/// assert_eq!(code.annotations[0].body, "Sets x.");
/// ```
pub fn parse(markdown: &str) -> Result<Document, ParseError> {
    AnnotationParser::new().parse(markdown)
}

/// Annotated markdown parser over a pluggable directive grammar.
///
/// Parsing is pure: the parser holds nothing but the grammar, so one parser
/// can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct AnnotationParser<G = BracketGrammar> {
    grammar: G,
}

impl AnnotationParser<BracketGrammar> {
    /// Create a parser using the bracket directive grammar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grammar: BracketGrammar,
        }
    }
}

impl<G: AnnotationGrammar> AnnotationParser<G> {
    /// Create a parser using a custom grammar.
    #[must_use]
    pub fn with_grammar(grammar: G) -> Self {
        Self { grammar }
    }

    /// Parse markdown into a [`Document`].
    ///
    /// The whole document is rejected on the first error.
    pub fn parse(&self, markdown: &str) -> Result<Document, ParseError> {
        let mut state = ParseState::new(&self.grammar);
        for (idx, line) in markdown.lines().enumerate() {
            state.process_line(line, idx + 1)?;
        }
        let doc = state.finish()?;

        tracing::debug!(
            blocks = doc.blocks.len(),
            code_blocks = doc.code_blocks().count(),
            "parsed annotated markdown"
        );
        Ok(doc)
    }
}

/// Annotation whose body is still being collected.
struct PendingAnnotation {
    block: usize,
    target: LineRange,
    order: usize,
    body: Vec<String>,
}

struct ParseState<'g, G> {
    grammar: &'g G,
    fence: FenceTracker,
    blocks: Vec<Block>,
    title: Option<String>,
    prose: Vec<String>,
    code_lines: Vec<String>,
    /// Index in `blocks` of the most recent code block.
    last_code: Option<usize>,
    pending: Option<PendingAnnotation>,
}

impl<'g, G: AnnotationGrammar> ParseState<'g, G> {
    fn new(grammar: &'g G) -> Self {
        Self {
            grammar,
            fence: FenceTracker::new(),
            blocks: Vec::new(),
            title: None,
            prose: Vec::new(),
            code_lines: Vec::new(),
            last_code: None,
            pending: None,
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), ParseError> {
        match self.fence.update(line, line_num) {
            FenceLine::Opened => {
                self.flush_pending();
                self.flush_prose();
                Ok(())
            }
            FenceLine::Content => {
                let content = self
                    .fence
                    .open_fence()
                    .map_or(line, |open| open.strip_indent(line));
                self.code_lines.push(content.to_owned());
                Ok(())
            }
            FenceLine::Closed(open) => {
                self.close_code_block(&open);
                Ok(())
            }
            FenceLine::Outside => self.outside_line(line, line_num),
        }
    }

    fn outside_line(&mut self, line: &str, line_num: usize) -> Result<(), ParseError> {
        let ctx = DirectiveContext {
            line: line_num,
            code_line_count: self.last_code_len(),
        };

        if let Some(result) = self.grammar.try_parse_directive(line, &ctx) {
            let directive = result.map_err(|err| ParseError::InvalidRange {
                line: line_num,
                reason: err.reason,
            })?;
            return self.start_annotation(&directive, line, line_num);
        }

        if let Some(pending) = &mut self.pending {
            if heading_text(line).is_none() {
                pending.body.push(line.to_owned());
                return Ok(());
            }
            self.flush_pending();
        }

        if self.title.is_none()
            && let Some((1, text)) = heading_text(line)
            && !text.is_empty()
        {
            self.title = Some(text.to_owned());
        }
        self.prose.push(line.to_owned());
        Ok(())
    }

    fn start_annotation(
        &mut self,
        directive: &Directive,
        line: &str,
        line_num: usize,
    ) -> Result<(), ParseError> {
        self.flush_pending();

        let Some(block) = self.last_code else {
            return Err(ParseError::DanglingAnnotation { line: line_num });
        };
        // Prose between the code block and this directive keeps its place.
        self.flush_prose();

        let Some(code) = self.code_block(block) else {
            return Err(ParseError::DanglingAnnotation { line: line_num });
        };

        let line_count = code.source_lines.len();
        if !directive.range.fits(line_count) {
            return Err(ParseError::InvalidRange {
                line: line_num,
                reason: format!(
                    "lines {} outside code block of {line_count} line(s)",
                    directive.range
                ),
            });
        }

        let expected = code.annotations.len() + 1;
        if let Some(found) = directive.order
            && found != expected
        {
            return Err(ParseError::DuplicateOrGappedOrder {
                line: line_num,
                expected,
                found,
            });
        }

        let first = line.get(directive.body_start..).unwrap_or("").trim();
        let body = if first.is_empty() {
            Vec::new()
        } else {
            vec![first.to_owned()]
        };

        self.pending = Some(PendingAnnotation {
            block,
            target: directive.range,
            order: expected,
            body,
        });
        Ok(())
    }

    fn code_block(&self, idx: usize) -> Option<&AnnotatedCodeBlock> {
        match self.blocks.get(idx) {
            Some(Block::Code(code)) => Some(code),
            _ => None,
        }
    }

    fn last_code_len(&self) -> Option<usize> {
        self.last_code
            .and_then(|idx| self.code_block(idx))
            .map(|code| code.source_lines.len())
    }

    fn close_code_block(&mut self, open: &OpenFence) {
        let source_lines = std::mem::take(&mut self.code_lines);
        self.blocks.push(Block::Code(AnnotatedCodeBlock {
            language: open.language().to_owned(),
            source_lines,
            annotations: Vec::new(),
        }));
        self.last_code = Some(self.blocks.len() - 1);
    }

    fn flush_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Some(Block::Code(code)) = self.blocks.get_mut(pending.block) {
            code.annotations.push(Annotation {
                target: pending.target,
                body: join_trimmed(&pending.body),
                order: pending.order,
            });
        }
    }

    fn flush_prose(&mut self) {
        let markdown = join_trimmed(&self.prose);
        self.prose.clear();
        if !markdown.is_empty() {
            self.blocks.push(Block::Prose(ProseBlock { markdown }));
        }
    }

    fn finish(mut self) -> Result<Document, ParseError> {
        if let Some(open) = self.fence.open_fence() {
            return Err(ParseError::MalformedFence {
                line: open.line,
                reason: "code fence is never closed".to_owned(),
            });
        }
        self.flush_pending();
        self.flush_prose();

        Ok(Document {
            title: self.title.unwrap_or_default(),
            blocks: self.blocks,
        })
    }
}

/// Join lines, dropping leading and trailing blank lines.
fn join_trimmed(lines: &[String]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Parse an ATX heading: returns (level, text).
fn heading_text(line: &str) -> Option<(usize, &str)> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let after = &rest[level..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }
    // A closing run of #s only counts when preceded by whitespace.
    let text = after.trim();
    let stripped = text.trim_end_matches('#');
    let text = if stripped.is_empty() {
        stripped
    } else if stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        text
    };
    Some((level, text))
}
