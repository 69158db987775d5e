//! Dialect-C engine: single-line `names : variant, variant` entries with
//! `:crypt` / `:endcrypt` regions whose entries are excluded.

pub mod lexer;
pub mod parser;

pub use lexer::{lex, LexState, LineToken};
pub use parser::{build_functions, parse_entries, Entry};

use crate::config::runtime::DialectCPreferences;
use crate::logging::{codes, Code};
use crate::model::DicFunction;
use crate::utils::{check_source_limits, SourceLimitError};
use crate::log_success;

#[derive(Debug, thiserror::Error)]
pub enum DialectCError {
    #[error(transparent)]
    Source(#[from] SourceLimitError),

    #[error("Entry declares {count} aliases, limit is {limit}")]
    TooManyAliases {
        line: usize,
        count: usize,
        limit: usize,
    },
}

impl DialectCError {
    pub fn error_code(&self) -> Code {
        match self {
            DialectCError::Source(e) => e.error_code(),
            DialectCError::TooManyAliases { .. } => codes::dialect_c::TOO_MANY_ALIASES,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            DialectCError::Source(_) => None,
            DialectCError::TooManyAliases { line, .. } => Some(*line),
        }
    }
}

/// Parse one file with default preferences
pub fn parse_file(file_path: &str, text: &str) -> Result<Vec<DicFunction>, DialectCError> {
    parse_file_with(file_path, text, &DialectCPreferences::default())
}

pub fn parse_file_with(
    file_path: &str,
    text: &str,
    preferences: &DialectCPreferences,
) -> Result<Vec<DicFunction>, DialectCError> {
    check_source_limits(text)?;

    let tokens = lex(text, preferences);
    let entries = parse_entries(&tokens, preferences)?;
    let entry_count = entries.len();
    let functions = build_functions(file_path, entries);

    log_success!(codes::success::DIALECT_C_ENTRIES_PARSED, "Dialect-C entries parsed",
        "entries" => entry_count,
        "functions" => functions.len());

    Ok(functions)
}
