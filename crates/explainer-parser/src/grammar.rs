//! Pluggable annotation directive grammars.
//!
//! The parser only depends on [`AnnotationGrammar`]: given a line outside any
//! code fence, a grammar decides whether the line is an annotation directive
//! and, if so, which lines of the preceding code block it targets.
//!
//! Two grammars ship with the crate:
//!
//! - [`BracketGrammar`]: `[[annotation: lines 1-3]]` (the default)
//! - [`HtmlCommentGrammar`]: `<!-- annotation: lines 1-3 -->`, invisible when
//!   the raw markdown is rendered elsewhere
//!
//! Both accept an optional explicit order (`[[annotation 2: lines 4-5]]`) and
//! a range spec of `N` or `N-M`, optionally prefixed by `line` / `lines`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::LineRange;

/// Position information handed to a grammar for each candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveContext {
    /// Input line number (1-indexed).
    pub line: usize,
    /// Line count of the code block a directive would bind to, if any.
    pub code_line_count: Option<usize>,
}

/// A recognized directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Targeted lines, relative to the owning code block.
    pub range: LineRange,
    /// Explicit order written in the directive, if any.
    pub order: Option<usize>,
    /// Byte offset in the line where the annotation body starts.
    pub body_start: usize,
}

/// A line that is a directive but whose range cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct DirectiveError {
    pub reason: String,
}

impl DirectiveError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Directive syntax capability.
///
/// Implementations must be pure: the same line and context always produce the
/// same answer. Returning `Some(Err(_))` marks the line as a directive with a
/// malformed range, which rejects the whole document.
pub trait AnnotationGrammar: Send + Sync {
    /// Try to recognize `line` as a directive.
    fn try_parse_directive(
        &self,
        line: &str,
        ctx: &DirectiveContext,
    ) -> Option<Result<Directive, DirectiveError>>;
}

impl<G: AnnotationGrammar + ?Sized> AnnotationGrammar for &G {
    fn try_parse_directive(
        &self,
        line: &str,
        ctx: &DirectiveContext,
    ) -> Option<Result<Directive, DirectiveError>> {
        (**self).try_parse_directive(line, ctx)
    }
}

impl<G: AnnotationGrammar + ?Sized> AnnotationGrammar for Box<G> {
    fn try_parse_directive(
        &self,
        line: &str,
        ctx: &DirectiveContext,
    ) -> Option<Result<Directive, DirectiveError>> {
        (**self).try_parse_directive(line, ctx)
    }
}

static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\[\[\s*annotation(?:\s+(?P<order>\S+?))?\s*:(?P<spec>[^\]]*)\]\]")
        .expect("bracket directive regex is valid")
});

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<!--\s*annotation(?:\s+(?P<order>\S+?))?\s*:(?P<spec>.*?)-->")
        .expect("comment directive regex is valid")
});

/// `[[annotation: lines 1-3]]` grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketGrammar;

impl AnnotationGrammar for BracketGrammar {
    fn try_parse_directive(
        &self,
        line: &str,
        _ctx: &DirectiveContext,
    ) -> Option<Result<Directive, DirectiveError>> {
        BRACKET_RE.captures(line).map(|caps| directive_from(&caps))
    }
}

/// `<!-- annotation: lines 1-3 -->` grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCommentGrammar;

impl AnnotationGrammar for HtmlCommentGrammar {
    fn try_parse_directive(
        &self,
        line: &str,
        _ctx: &DirectiveContext,
    ) -> Option<Result<Directive, DirectiveError>> {
        COMMENT_RE.captures(line).map(|caps| directive_from(&caps))
    }
}

fn directive_from(caps: &Captures<'_>) -> Result<Directive, DirectiveError> {
    let body_start = caps.get(0).map_or(0, |m| m.end());
    let order = caps
        .name("order")
        .map(|m| parse_order(m.as_str()))
        .transpose()?;
    let spec = caps.name("spec").map_or("", |m| m.as_str());
    let range = parse_range_spec(spec)?;

    Ok(Directive {
        range,
        order,
        body_start,
    })
}

fn parse_order(text: &str) -> Result<usize, DirectiveError> {
    match text.parse::<usize>() {
        Ok(0) => Err(DirectiveError::new("annotation order starts at 1")),
        Ok(n) => Ok(n),
        Err(_) => Err(DirectiveError::new(format!(
            "annotation order {text:?} is not a number"
        ))),
    }
}

/// Parse `N`, `N-M`, `line N` or `lines N-M` into a [`LineRange`].
///
/// # Examples
///
/// ```
/// use explainer_parser::{LineRange, parse_range_spec};
///
/// assert_eq!(parse_range_spec("lines 2-4").unwrap(), LineRange::new(2, 4).unwrap());
/// assert_eq!(parse_range_spec("line 7").unwrap(), LineRange::single(7).unwrap());
/// assert!(parse_range_spec("lines 4-2").is_err());
/// ```
pub fn parse_range_spec(spec: &str) -> Result<LineRange, DirectiveError> {
    let trimmed = spec.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let numbers = ["lines", "line"]
        .iter()
        .find_map(|kw| lowered.strip_prefix(kw).map(|_| trimmed[kw.len()..].trim()))
        .unwrap_or(trimmed);

    if numbers.is_empty() {
        return Err(DirectiveError::new("missing line range"));
    }

    let (start_text, end_text) = match numbers.split_once('-') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (numbers, numbers),
    };

    let start = parse_line_number(start_text)?;
    let end = parse_line_number(end_text)?;

    LineRange::new(start, end).ok_or_else(|| {
        DirectiveError::new(format!("end {end} is before start {start}"))
    })
}

fn parse_line_number(text: &str) -> Result<usize, DirectiveError> {
    match text.parse::<usize>() {
        Ok(0) => Err(DirectiveError::new("line numbers start at 1")),
        Ok(n) => Ok(n),
        Err(_) => Err(DirectiveError::new(format!(
            "{text:?} is not a line number"
        ))),
    }
}
