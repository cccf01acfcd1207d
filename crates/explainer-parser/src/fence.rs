//! Code fence tracking for line-by-line parsing.
//!
//! Fences use backticks or tildes (three or more), indented by at most three
//! spaces. The closing fence must use the same character, be at least as long
//! as the opening fence and carry nothing but whitespace after it.

/// Maximum indentation of a fence line; deeper lines are indented code.
const MAX_FENCE_INDENT: usize = 3;

/// Opening fence of the block currently being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenFence {
    fence_char: char,
    fence_len: usize,
    indent: usize,
    /// Full info string after the fence characters, trimmed.
    pub(crate) info: String,
    /// Input line of the opening fence (1-indexed).
    pub(crate) line: usize,
}

impl OpenFence {
    /// Language tag: the first word of the info string.
    pub(crate) fn language(&self) -> &str {
        self.info.split_whitespace().next().unwrap_or("")
    }

    /// Strip up to the opening fence's indentation from a content line.
    pub(crate) fn strip_indent<'a>(&self, line: &'a str) -> &'a str {
        let spaces = line
            .bytes()
            .take(self.indent)
            .take_while(|&b| b == b' ')
            .count();
        &line[spaces..]
    }
}

/// Classification of one input line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FenceLine {
    /// Line opened a fence.
    Opened,
    /// Line closed the fence; carries the opening fence.
    Closed(OpenFence),
    /// Line is literal content of the open fence.
    Content,
    /// Line is outside any fence.
    Outside,
}

/// Tracks code fence state during line-by-line processing.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The fence currently open, if any.
    pub(crate) fn open_fence(&self) -> Option<&OpenFence> {
        self.open.as_ref()
    }

    /// Update fence state with the next line and classify it.
    pub(crate) fn update(&mut self, line: &str, line_num: usize) -> FenceLine {
        if let Some(open) = &self.open {
            if is_closing_fence(line, open.fence_char, open.fence_len) {
                return self.open.take().map_or(FenceLine::Content, FenceLine::Closed);
            }
            return FenceLine::Content;
        }

        match detect_fence(line) {
            Some((fence_char, fence_len, indent)) => {
                let info = line[indent + fence_len * fence_char.len_utf8()..].trim();
                self.open = Some(OpenFence {
                    fence_char,
                    fence_len,
                    indent,
                    info: info.to_owned(),
                    line: line_num,
                });
                FenceLine::Opened
            }
            None => FenceLine::Outside,
        }
    }
}

/// Count leading spaces if they are a valid fence indentation.
fn fence_indent(line: &str) -> Option<usize> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    (indent <= MAX_FENCE_INDENT).then_some(indent)
}

/// Detect an opening fence: returns (char, length, indent).
fn detect_fence(line: &str) -> Option<(char, usize, usize)> {
    let indent = fence_indent(line)?;
    let rest = &line[indent..];
    let first = rest.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = rest.chars().take_while(|&c| c == first).count();
    if count < 3 {
        return None;
    }

    // A backtick info string may not contain backticks (that is inline code).
    if first == '`' && rest[count..].contains('`') {
        return None;
    }

    Some((first, count, indent))
}

/// Check whether a line closes a fence opened with `expected_char` x `min_len`.
fn is_closing_fence(line: &str, expected_char: char, min_len: usize) -> bool {
    let Some(indent) = fence_indent(line) else {
        return false;
    };
    let rest = &line[indent..];

    let count = rest.chars().take_while(|&c| c == expected_char).count();
    if count < min_len {
        return false;
    }

    rest[count * expected_char.len_utf8()..]
        .chars()
        .all(char::is_whitespace)
}
