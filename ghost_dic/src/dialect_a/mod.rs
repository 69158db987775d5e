//! Dialect-A engine: brace-structured imperative scripts
//!
//! Pipeline per file: preprocess (with the batch's `PreprocessorState`),
//! lex, parse, then extract dialogues from each function declaration.

pub mod ast;
pub mod extractor;
pub mod lexer;
pub mod parser;
pub mod preprocess;

pub use ast::{FunctionDecl, Program, Statement};
pub use extractor::extract_dialogues;
pub use lexer::{lex, LexToken, TokenKind};
pub use parser::parse;
pub use preprocess::{preprocess, PreprocessorState};

use crate::config::runtime::DialectAPreferences;
use crate::logging::{codes, Code};
use crate::model::DicFunction;
use crate::utils::{check_source_limits, SourceLimitError};
use crate::{log_error, log_success};

#[derive(Debug, thiserror::Error)]
pub enum DialectAError {
    #[error(transparent)]
    Source(#[from] SourceLimitError),

    #[error("Unexpected token '{found}' at line {line}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("Unexpected end of input, expected {expected} (block opened at line {line})")]
    UnexpectedEndOfInput { expected: String, line: usize },

    #[error("Unmatched '{delimiter}' at line {line}")]
    UnmatchedDelimiter { delimiter: char, line: usize },

    #[error("Blocks nested deeper than {limit} at line {line}")]
    NestingTooDeep { line: usize, limit: usize },

    #[error("More than {limit} preprocessor defines at line {line}")]
    TooManyDefines { line: usize, limit: usize },
}

impl DialectAError {
    pub fn error_code(&self) -> Code {
        match self {
            DialectAError::Source(e) => e.error_code(),
            DialectAError::UnexpectedToken { .. } => codes::dialect_a::UNEXPECTED_TOKEN,
            DialectAError::UnexpectedEndOfInput { .. } => codes::dialect_a::UNEXPECTED_END_OF_INPUT,
            DialectAError::UnmatchedDelimiter { .. } => codes::dialect_a::UNMATCHED_DELIMITER,
            DialectAError::NestingTooDeep { .. } => codes::dialect_a::MAX_NESTING_DEPTH,
            DialectAError::TooManyDefines { .. } => codes::dialect_a::TOO_MANY_DEFINES,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            DialectAError::Source(_) => None,
            DialectAError::UnexpectedToken { line, .. }
            | DialectAError::UnexpectedEndOfInput { line, .. }
            | DialectAError::UnmatchedDelimiter { line, .. }
            | DialectAError::NestingTooDeep { line, .. }
            | DialectAError::TooManyDefines { line, .. } => Some(*line),
        }
    }
}

/// One function per declaration site
pub fn build_functions(
    file_path: &str,
    program: &Program,
    preferences: &DialectAPreferences,
) -> Vec<DicFunction> {
    program
        .functions()
        .map(|function| {
            DicFunction::new(
                function.name.as_str(),
                file_path,
                function.loc.start.line,
                function.loc.end.line,
                extract_dialogues(function, preferences.merge_invisible_fragments),
            )
        })
        .collect()
}

/// Preprocess, lex and parse one file into its syntax tree
pub fn parse_program(
    text: &str,
    preferences: &DialectAPreferences,
    state: &mut PreprocessorState,
) -> Result<Program, DialectAError> {
    check_source_limits(text)?;
    let source = preprocess(text, state, preferences.enable_preprocessor)?;
    let tokens = lex(&source);
    parse(&tokens)
}

/// Parse a standalone file with default preferences and fresh state
pub fn parse_file(file_path: &str, text: &str) -> Result<Vec<DicFunction>, DialectAError> {
    let mut state = PreprocessorState::new();
    parse_file_with(file_path, text, &DialectAPreferences::default(), &mut state)
}

pub fn parse_file_with(
    file_path: &str,
    text: &str,
    preferences: &DialectAPreferences,
    state: &mut PreprocessorState,
) -> Result<Vec<DicFunction>, DialectAError> {
    let program = parse_program(text, preferences, state).map_err(|error| {
        log_error!(error.error_code(), "Dialect-A parse failed",
            "file" => file_path,
            "line" => error.line().map_or_else(|| "-".to_string(), |l| l.to_string()),
            "error" => error);
        error
    })?;

    let functions = build_functions(file_path, &program, preferences);

    log_success!(codes::success::DIALECT_A_EXTRACTION_COMPLETE, "Dialect-A extraction complete",
        "functions" => functions.len(),
        "dialogues" => functions.iter().map(|f| f.dialogues.len()).sum::<usize>(),
        "global_defines" => state.global_count());

    Ok(functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_functions_with_lines() {
        let source = "OnBoot {\n\"hello\"\n}\n\nOnClose\n{\n\"bye\"\n\"now\"\n}";
        let functions = parse_file("a.dic", source).unwrap();

        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "OnBoot");
        assert_eq!((functions[0].start_line, functions[0].end_line), (0, 2));
        assert_eq!(functions[1].name, "OnClose");
        assert_eq!((functions[1].start_line, functions[1].end_line), (4, 8));
        assert_eq!(functions[1].dialogues[0].raw_text, "byenow");
        assert_eq!(functions[1].file_path, "a.dic");
    }

    #[test]
    fn test_same_name_declared_twice() {
        let functions = parse_file("a.dic", "f { \"1\" }\nf { \"2\" }").unwrap();
        assert_eq!(functions.len(), 2);
    }

    #[test]
    fn test_global_define_reaches_next_file() {
        let preferences = DialectAPreferences::default();
        let mut state = PreprocessorState::new();

        parse_file_with("a.dic", "#globaldefine %NAME ghost", &preferences, &mut state).unwrap();
        let functions =
            parse_file_with("b.dic", "f { \"I am %NAME\" }", &preferences, &mut state).unwrap();

        assert_eq!(functions[0].dialogues[0].raw_text, "I am ghost");
    }

    #[test]
    fn test_unbalanced_brace_is_an_error() {
        let error = parse_file("a.dic", "OnBoot {\n\"a\"\nif x {\n\"b\"\n}").unwrap_err();

        assert_matches!(error, DialectAError::UnexpectedEndOfInput { .. });
        assert_eq!(error.error_code(), codes::dialect_a::UNEXPECTED_END_OF_INPUT);
        assert_eq!(error.line(), Some(0));
    }

    #[test]
    fn test_error_codes_and_lines() {
        let error = DialectAError::UnmatchedDelimiter {
            delimiter: '}',
            line: 7,
        };
        assert_eq!(error.error_code(), codes::dialect_a::UNMATCHED_DELIMITER);
        assert_eq!(error.line(), Some(7));
        assert_eq!(error.to_string(), "Unmatched '}' at line 7");
    }
}
