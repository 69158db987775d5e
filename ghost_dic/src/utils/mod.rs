//! Shared primitives used by every dialect engine: source locations and
//! line/quote-aware text helpers.

pub mod span;
pub mod text;

pub use span::{Position, Span};
pub use text::{
    char_width, check_source_limits, find_unquoted, split_lines, split_unquoted, SourceLimitError,
    SourceLine,
};
