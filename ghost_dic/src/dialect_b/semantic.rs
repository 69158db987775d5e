//! Symbol table and semantic pass
//!
//! One walk over the program collects event declarations, `＄` variable
//! definitions and `$(name)` references. Definitions are then registered in
//! document order (last write wins) and references resolved against them.
//! Duplicate events are errors; re-defined variables are not.

use super::ast::{Block, Program, SectionMarker};
use super::DialectBError;
use crate::config::constants::compile_time::dialect_b::MAX_SYMBOLS;
use crate::config::runtime::DialectBPreferences;
use crate::logging::{codes, Code};
use crate::utils::{char_width, Span};
use crate::{log_debug, log_error, log_warning};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Event,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub kind: SymbolKind,
    pub def_loc: Span,
    pub ref_locs: Vec<Span>,
}

/// Single global scope
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, name: &str, symbol: Symbol) -> Result<(), DialectBError> {
        if !self.symbols.contains_key(name) && self.symbols.len() >= MAX_SYMBOLS {
            return Err(DialectBError::TooManySymbols { limit: MAX_SYMBOLS });
        }
        self.symbols.insert(name.to_string(), symbol);
        Ok(())
    }
}

/// Diagnostic produced by the semantic pass, before it is tied to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticIssue {
    pub code: Code,
    pub is_error: bool,
    pub message: String,
    pub loc: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub issues: Vec<SemanticIssue>,
}

/// `$(name)` occurrences in a line: (name, byte offset, byte length)
pub fn variable_references(text: &str) -> Vec<(&str, usize, usize)> {
    let mut references = Vec::new();
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find("$(") {
        let start = search_from + found;
        let name_start = start + 2;
        let Some(close) = text[name_start..].find(')') else {
            break;
        };
        let end = name_start + close + 1;
        let name = text[name_start..name_start + close].trim();
        if !name.is_empty() {
            references.push((name, start, end - start));
        }
        search_from = end;
    }

    references
}

/// `name=value` or `name＝value`, split at the first separator
fn definition_name<'a>(text: &'a str, preferences: &DialectBPreferences) -> Option<&'a str> {
    let ascii = text.find('=');
    let fullwidth = if preferences.accept_fullwidth_assignment {
        text.find('＝')
    } else {
        None
    };
    let split = match (ascii, fullwidth) {
        (Some(a), Some(f)) => a.min(f),
        (Some(a), None) => a,
        (None, Some(f)) => f,
        (None, None) => return None,
    };

    let name = text[..split].trim();
    (!name.is_empty()).then_some(name)
}

pub fn analyze(
    program: &Program,
    preferences: &DialectBPreferences,
) -> Result<Analysis, DialectBError> {
    let mut analysis = Analysis::default();
    let mut definitions: Vec<(&str, Span)> = Vec::new();
    let mut references: Vec<(&str, Span)> = Vec::new();

    // Walk: events go straight into the table, definitions and references wait
    for block in &program.body {
        if let Block::EventDecl(event) = block {
            match analysis.symbols.get(&event.name) {
                Some(existing) if existing.kind == SymbolKind::Event => {
                    log_error!(codes::dialect_b::DUPLICATE_EVENT, "Duplicate event declaration",
                        span = event.loc,
                        "name" => event.name,
                        "first_line" => existing.def_loc.start.line);
                    analysis.issues.push(SemanticIssue {
                        code: codes::dialect_b::DUPLICATE_EVENT,
                        is_error: true,
                        message: format!("Duplicate event declaration: {}", event.name),
                        loc: event.loc,
                    });
                }
                _ => analysis.symbols.insert(
                    &event.name,
                    Symbol {
                        kind: SymbolKind::Event,
                        def_loc: event.loc,
                        ref_locs: Vec::new(),
                    },
                )?,
            }
        }

        let defines_variables = matches!(
            block,
            Block::SectionBlock(section) if section.separator.marker == SectionMarker::Dollar
        );

        for (text, loc) in block.text_lines() {
            if defines_variables {
                if let Some(name) = definition_name(text, preferences) {
                    definitions.push((name, loc));
                }
            }
            for (name, offset, len) in variable_references(text) {
                let column = loc.start.column + char_width(&text[..offset]);
                let width = char_width(&text[offset..offset + len]);
                references.push((name, Span::on_line(loc.start.line, column, column + width)));
            }
        }
    }

    // Definitions in document order; a later one replaces the definition site
    for (name, loc) in definitions {
        let ref_locs = match analysis.symbols.get(name) {
            Some(existing) if existing.kind == SymbolKind::Event => {
                log_warning!(codes::dialect_b::VARIABLE_SHADOWS_EVENT,
                    "Variable definition uses an event name",
                    span = loc,
                    "name" => name);
                analysis.issues.push(SemanticIssue {
                    code: codes::dialect_b::VARIABLE_SHADOWS_EVENT,
                    is_error: false,
                    message: format!("Variable uses the name of an event: {}", name),
                    loc,
                });
                continue;
            }
            Some(existing) => existing.ref_locs.clone(),
            None => Vec::new(),
        };
        analysis.symbols.insert(
            name,
            Symbol {
                kind: SymbolKind::Variable,
                def_loc: loc,
                ref_locs,
            },
        )?;
    }

    // References in document order
    for (name, loc) in references {
        match analysis.symbols.symbols.get_mut(name) {
            Some(symbol) if symbol.kind == SymbolKind::Variable => symbol.ref_locs.push(loc),
            _ => {
                log_error!(codes::dialect_b::UNDEFINED_VARIABLE, "Undefined variable",
                    span = loc,
                    "name" => name);
                analysis.issues.push(SemanticIssue {
                    code: codes::dialect_b::UNDEFINED_VARIABLE,
                    is_error: true,
                    message: format!("Undefined variable: {}", name),
                    loc,
                });
            }
        }
    }

    log_debug!("Dialect-B symbol table built",
        "symbols" => analysis.symbols.len(),
        "issues" => analysis.issues.len());

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect_b::{lexer::lex, parser::parse};

    fn analyze_source(source: &str) -> Analysis {
        let preferences = DialectBPreferences::default();
        let program = parse("b.txt", &lex(source, &preferences));
        analyze(&program, &preferences).unwrap()
    }

    #[test]
    fn test_variable_references_scan() {
        let refs = variable_references("a $(x) b $( y ) $() $(unclosed");
        let names: Vec<_> = refs.iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(refs[0].1, 2);
        assert_eq!(refs[0].2, 4);
    }

    #[test]
    fn test_duplicate_event_keeps_first() {
        let analysis = analyze_source("＊OnBoot\n：a\n＊OnBoot\n：b");

        assert_eq!(analysis.issues.len(), 1);
        let issue = &analysis.issues[0];
        assert!(issue.is_error);
        assert!(issue.message.contains("Duplicate event declaration"));
        assert_eq!(issue.loc.start.line, 2);

        let symbol = analysis.symbols.get("OnBoot").unwrap();
        assert_eq!(symbol.def_loc.start.line, 0);
    }

    #[test]
    fn test_variable_resolution() {
        let analysis = analyze_source("＄\nname=ghost\n＊OnBoot\n：hello $(name)");

        assert!(analysis.issues.is_empty());
        let symbol = analysis.symbols.get("name").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Variable);
        assert_eq!(symbol.def_loc.start.line, 1);
        assert_eq!(symbol.ref_locs, vec![Span::on_line(3, 7, 14)]);
    }

    #[test]
    fn test_undefined_variable() {
        let analysis = analyze_source("＊OnBoot\n：$(unknown)");

        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].message, "Undefined variable: unknown");
        assert_eq!(analysis.issues[0].code, codes::dialect_b::UNDEFINED_VARIABLE);
        assert!(analysis.symbols.get("unknown").is_none());
    }

    #[test]
    fn test_reference_before_definition_resolves() {
        let analysis = analyze_source("＊OnBoot\n：$(who)\n＄\nwho＝me\nwho=you");

        assert!(analysis.issues.is_empty());
        let symbol = analysis.symbols.get("who").unwrap();
        // last write wins
        assert_eq!(symbol.def_loc.start.line, 4);
        assert_eq!(symbol.ref_locs.len(), 1);
    }

    #[test]
    fn test_refs_survive_redefinition() {
        let analysis = analyze_source("＄\nx=1\n$(x)\nx=2\n＊OnA\n：$(x)$(x)");
        let symbol = analysis.symbols.get("x").unwrap();
        assert_eq!(symbol.ref_locs.len(), 3);
        assert_eq!(symbol.ref_locs[0].start.line, 2);
    }

    #[test]
    fn test_at_section_does_not_define() {
        let analysis = analyze_source("＠words\nname=ghost\n＊OnBoot\n：$(name)");
        assert_eq!(analysis.issues.len(), 1);
        assert!(analysis.issues[0].message.contains("Undefined variable: name"));
    }

    #[test]
    fn test_variable_named_like_event_warns() {
        let analysis = analyze_source("＊OnBoot\n：hi\n＄\nOnBoot=1");

        assert_eq!(analysis.issues.len(), 1);
        assert!(!analysis.issues[0].is_error);
        assert_eq!(analysis.issues[0].code, codes::dialect_b::VARIABLE_SHADOWS_EVENT);
        assert_eq!(
            analysis.symbols.get("OnBoot").map(|s| s.kind),
            Some(SymbolKind::Event)
        );
    }

    #[test]
    fn test_fullwidth_assignment_can_be_disabled() {
        let preferences = DialectBPreferences {
            strip_continuation_prefix: true,
            accept_fullwidth_assignment: false,
        };
        let program = parse("b.txt", &lex("＄\nwho＝me\n＊OnA\n：$(who)", &preferences));
        let analysis = analyze(&program, &preferences).unwrap();
        assert_eq!(analysis.issues.len(), 1);
    }
}
