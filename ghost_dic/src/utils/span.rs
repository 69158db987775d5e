//! Source location tracking for dictionary sources
//!
//! Locations are plain value types computed while lexing. Lines and columns
//! are zero-based and refer to the dialect source file; columns count
//! characters, not bytes.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (0-based)
    pub line: usize,
    /// Column number in characters (0-based)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive column)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Span covering `start_column..end_column` of a single line
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(
            Position::new(line, start_column),
            Position::new(line, end_column),
        )
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of source lines touched by this span
    pub fn line_count(&self) -> usize {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        let a = Span::on_line(2, 4, 9);
        let b = Span::on_line(5, 0, 3);
        let merged = a.merge(b);

        assert_eq!(merged.start, Position::new(2, 4));
        assert_eq!(merged.end, Position::new(5, 3));
        assert_eq!(merged.line_count(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::on_line(3, 1, 7).to_string(), "3:1-7");
        assert_eq!(
            Span::new(Position::new(1, 0), Position::new(2, 4)).to_string(),
            "1:0-2:4"
        );
    }
}
