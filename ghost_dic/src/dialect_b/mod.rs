//! Dialect-B engine: `＊event` blocks of `：dialogue` lines, `＠`/`＄` sections
//! and a symbol-table pass over events and `$(name)` variables.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use ast::{Block, EventDecl, Program, SectionBlock, SectionMarker};
pub use lexer::{lex, LineKind, LineToken};
pub use parser::parse;
pub use semantic::{analyze, Analysis, SemanticIssue, Symbol, SymbolKind, SymbolTable};

use crate::config::runtime::DialectBPreferences;
use crate::logging::{codes, Code};
use crate::model::{Dialogue, DicFunction, ParseDiagnostic};
use crate::utils::{check_source_limits, SourceLimitError};
use crate::log_success;

#[derive(Debug, thiserror::Error)]
pub enum DialectBError {
    #[error(transparent)]
    Source(#[from] SourceLimitError),

    #[error("Symbol table limit of {limit} entries exceeded")]
    TooManySymbols { limit: usize },
}

impl DialectBError {
    pub fn error_code(&self) -> Code {
        match self {
            DialectBError::Source(e) => e.error_code(),
            DialectBError::TooManySymbols { .. } => codes::dialect_b::TOO_MANY_SYMBOLS,
        }
    }

    pub fn line(&self) -> Option<usize> {
        None
    }
}

/// Everything one Dialect-B file produces
#[derive(Debug, Clone)]
pub struct DialectBOutput {
    pub program: Program,
    pub symbols: SymbolTable,
    pub functions: Vec<DicFunction>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// One function per event declaration site, one dialogue per `：` line
pub fn build_functions(program: &Program) -> Vec<DicFunction> {
    program
        .body
        .iter()
        .filter_map(|block| match block {
            Block::EventDecl(event) => Some(event),
            Block::SectionBlock(_) => None,
        })
        .map(|event| {
            let dialogues = event
                .dialogue_lines()
                .map(|line| Dialogue::on_line(line.text.as_str(), line.loc.start.line))
                .collect();
            DicFunction::new(
                event.name.as_str(),
                program.file_path.as_str(),
                event.loc.start.line,
                event.loc.end.line,
                dialogues,
            )
        })
        .collect()
}

fn to_diagnostic(file_path: &str, issue: SemanticIssue) -> ParseDiagnostic {
    let line = Some(issue.loc.start.line);
    if issue.is_error {
        ParseDiagnostic::error(issue.code, issue.message, file_path, line)
    } else {
        ParseDiagnostic::warning(issue.code, issue.message, file_path, line)
    }
}

pub fn parse_file(file_path: &str, text: &str) -> Result<DialectBOutput, DialectBError> {
    parse_file_with(file_path, text, &DialectBPreferences::default())
}

pub fn parse_file_with(
    file_path: &str,
    text: &str,
    preferences: &DialectBPreferences,
) -> Result<DialectBOutput, DialectBError> {
    check_source_limits(text)?;

    let tokens = lex(text, preferences);
    let program = parse(file_path, &tokens);
    let Analysis { symbols, issues } = analyze(&program, preferences)?;

    let functions = build_functions(&program);
    let diagnostics: Vec<_> = issues
        .into_iter()
        .map(|issue| to_diagnostic(file_path, issue))
        .collect();

    log_success!(codes::success::DIALECT_B_ANALYSIS_COMPLETE, "Dialect-B analysis complete",
        "blocks" => program.body.len(),
        "symbols" => symbols.len(),
        "diagnostics" => diagnostics.len());

    Ok(DialectBOutput {
        program,
        symbols,
        functions,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiagnosticLevel;

    #[test]
    fn test_duplicate_event_reported_once() {
        let output = parse_file("b.txt", "＊OnBoot\n：first\n＊OnBoot\n：second").unwrap();

        let errors: Vec<_> = output.diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Duplicate event declaration"));
        assert_eq!(errors[0].code, "E090");
        assert_eq!(errors[0].line, Some(2));
        assert_eq!(errors[0].file_path, "b.txt");

        let symbol = output.symbols.get("OnBoot").unwrap();
        assert_eq!(symbol.def_loc.start.line, 0);

        // both declaration sites still produce functions
        assert_eq!(output.functions.len(), 2);
    }

    #[test]
    fn test_defined_variable_resolves() {
        let output = parse_file("b.txt", "＄\nname=ghost\n＊OnBoot\n：hello $(name)").unwrap();

        assert!(output.diagnostics.is_empty());
        let symbol = output.symbols.get("name").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Variable);
        assert_eq!(symbol.ref_locs.len(), 1);
    }

    #[test]
    fn test_undefined_variable_reported() {
        let output = parse_file("b.txt", "＊OnBoot\n：$(unknown)").unwrap();

        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].level, DiagnosticLevel::Error);
        assert!(output.diagnostics[0]
            .message
            .contains("Undefined variable: unknown"));
        assert_eq!(output.diagnostics[0].line, Some(1));
    }

    #[test]
    fn test_functions_from_events() {
        let source = "＊OnBoot\n：\\0\\s[0]hello\\e\nnote\n：bye\n＠words\n：ignored";
        let output = parse_file("b.txt", source).unwrap();

        assert_eq!(output.functions.len(), 1);
        let function = &output.functions[0];
        assert_eq!(function.name, "OnBoot");
        assert_eq!(function.file_path, "b.txt");
        assert_eq!(function.start_line, 0);
        assert_eq!(function.end_line, 3);
        assert_eq!(function.dialogues.len(), 2);
        assert_eq!(function.dialogues[0].raw_text, "\\0\\s[0]hello\\e");
        assert_eq!(function.dialogues[0].start_line, 1);
        assert_eq!(function.dialogues[1].start_line, 3);
    }

    #[test]
    fn test_continuation_prefix_lines() {
        let output = parse_file("b.txt", "＊OnA\n→：one\n→：two").unwrap();
        assert_eq!(output.functions[0].dialogues.len(), 2);
        assert_eq!(output.functions[0].dialogues[1].raw_text, "two");
    }

    #[test]
    fn test_crlf_source() {
        let output = parse_file("b.txt", "＊OnA\r\n：hi\r\n").unwrap();
        assert_eq!(output.functions[0].dialogues[0].raw_text, "hi");
        assert_eq!(output.functions[0].end_line, 1);
    }

    #[test]
    fn test_error_codes() {
        let error = DialectBError::TooManySymbols { limit: 10 };
        assert_eq!(error.error_code(), codes::dialect_b::TOO_MANY_SYMBOLS);
        assert_eq!(error.line(), None);
    }
}
