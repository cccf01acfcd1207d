//! Structured document model produced by the parser.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parsed annotated-code document.
///
/// `blocks` is the authoritative reading order and is never re-sorted.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Document {
    /// Text of the first H1 heading, or empty.
    pub title: String,
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
}

impl Document {
    /// Iterate over the annotated code blocks of the document.
    pub fn code_blocks(&self) -> impl Iterator<Item = &AnnotatedCodeBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Code(code) => Some(code),
            Block::Prose(_) => None,
        })
    }
}

/// A top-level block of a [`Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Narrative markdown outside any fence or annotation.
    Prose(ProseBlock),
    /// Fenced code with its annotations.
    Code(AnnotatedCodeBlock),
}

/// Narrative markdown, kept verbatim for the markup transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProseBlock {
    pub markdown: String,
}

/// A fenced code block and the annotations bound to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedCodeBlock {
    /// First word of the fence info string; empty if none.
    pub language: String,
    pub source_lines: Vec<String>,
    /// Annotations in declaration order, numbered from 1.
    pub annotations: Vec<Annotation>,
}

/// Prose callout bound to a range of code lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub target: LineRange,
    /// Markdown body.
    pub body: String,
    /// 1-based position among the sibling annotations.
    pub order: usize,
}

/// Inclusive, 1-indexed range of lines within one code block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Create a range, rejecting `start == 0` and `end < start`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start >= 1 && end >= start).then_some(Self { start, end })
    }

    /// Range covering a single line.
    #[must_use]
    pub fn single(line: usize) -> Option<Self> {
        Self::new(line, line)
    }

    /// Number of lines covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; ranges cover at least one line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `line` (1-indexed) falls inside the range.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }

    /// Whether the range fits inside a block of `line_count` lines.
    #[must_use]
    pub fn fits(&self, line_count: usize) -> bool {
        self.start >= 1 && self.start <= self.end && self.end <= line_count
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
