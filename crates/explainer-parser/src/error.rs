//! Parse error types.

/// Error rejecting a whole document.
///
/// Line numbers are 1-indexed positions in the input markdown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Directive with no preceding fenced code block.
    #[error("line {line}: annotation appears before any code block")]
    DanglingAnnotation { line: usize },

    /// Malformed range syntax or a range outside the owning block.
    #[error("line {line}: invalid line range: {reason}")]
    InvalidRange { line: usize, reason: String },

    /// Explicit order that does not continue the block's numbering.
    #[error("line {line}: annotation numbered {found}, expected {expected}")]
    DuplicateOrGappedOrder {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Fence that cannot be parsed, e.g. never closed.
    #[error("line {line}: malformed code fence: {reason}")]
    MalformedFence { line: usize, reason: String },
}

impl ParseError {
    /// Input line the error was detected on.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::DanglingAnnotation { line }
            | Self::InvalidRange { line, .. }
            | Self::DuplicateOrGappedOrder { line, .. }
            | Self::MalformedFence { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = ParseError::InvalidRange {
            line: 12,
            reason: "end 3 is before start 5".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "line 12: invalid line range: end 3 is before start 5"
        );
        assert_eq!(err.line(), 12);
    }

    #[test]
    fn test_display_order() {
        let err = ParseError::DuplicateOrGappedOrder {
            line: 4,
            expected: 2,
            found: 3,
        };
        assert_eq!(err.to_string(), "line 4: annotation numbered 3, expected 2");
    }
}
