//! Line splitting and quote-aware splitting shared by the line-oriented lexers

use crate::config::constants::compile_time::source::{MAX_SOURCE_BYTES, MAX_SOURCE_LINES};
use crate::logging::{codes, Code};

/// A source file rejected before lexing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceLimitError {
    #[error("Source is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Source has more than {limit} lines")]
    TooManyLines { limit: usize },
}

impl SourceLimitError {
    pub fn error_code(&self) -> Code {
        match self {
            SourceLimitError::TooLarge { .. } => codes::source::SOURCE_TOO_LARGE,
            SourceLimitError::TooManyLines { .. } => codes::source::TOO_MANY_LINES,
        }
    }
}

/// Reject sources above the compile-time size and line limits
pub fn check_source_limits(text: &str) -> Result<(), SourceLimitError> {
    if text.len() > MAX_SOURCE_BYTES {
        return Err(SourceLimitError::TooLarge {
            size: text.len(),
            limit: MAX_SOURCE_BYTES,
        });
    }
    // CRLF counts twice here; the limit is a coarse guard
    let terminators = text.bytes().filter(|b| *b == b'\n' || *b == b'\r').count();
    if terminators > MAX_SOURCE_LINES * 2 {
        return Err(SourceLimitError::TooManyLines {
            limit: MAX_SOURCE_LINES,
        });
    }
    Ok(())
}

/// One physical line of a source file, without its terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Line number (0-based)
    pub number: usize,
    pub text: &'a str,
}

/// Split text into lines, accepting CR, LF and CRLF as terminators.
///
/// A final line without terminator is still produced; a terminator at the
/// very end of the input does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<SourceLine<'_>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(SourceLine {
                    number: lines.len(),
                    text: &text[start..i],
                });
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(SourceLine {
                    number: lines.len(),
                    text: &text[start..i],
                });
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        lines.push(SourceLine {
            number: lines.len(),
            text: &text[start..],
        });
    }

    lines
}

/// Byte index of the first `target` that is not inside a double-quoted span.
///
/// Quote state toggles on every `"`, independent of escaping.
pub fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut quoted = false;
    for (index, ch) in text.char_indices() {
        if ch == '"' {
            quoted = !quoted;
        } else if ch == target && !quoted {
            return Some(index);
        }
    }
    None
}

/// Split on every `separator` outside double quotes
pub fn split_unquoted(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        if ch == '"' {
            quoted = !quoted;
        } else if ch == separator && !quoted {
            parts.push(&text[start..index]);
            start = index + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Width of a string in characters, as used for column numbers
pub fn char_width(text: &str) -> usize {
    text.chars().count()
}
