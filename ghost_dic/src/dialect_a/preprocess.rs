//! `#define` / `#globaldefine` text substitution
//!
//! Directive lines are blanked in place so line numbers survive. File-local
//! defines die with the file; global defines live in `PreprocessorState`,
//! which the caller carries from one file of a batch to the next.

use super::DialectAError;
use crate::config::constants::compile_time::dialect_a::MAX_DEFINES;
use crate::utils::split_lines;
use crate::log_debug;

const DEFINE: &str = "#define";
const GLOBAL_DEFINE: &str = "#globaldefine";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: String,
}

/// Batch-scoped preprocessor state, created once per batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessorState {
    globals: Vec<Define>,
}

impl PreprocessorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globals(&self) -> &[Define] {
        &self.globals
    }

    pub fn global_count(&self) -> usize {
        self.globals.len()
    }
}

/// `NAME value` after the directive keyword; the value may be empty
fn parse_define(rest: &str) -> Option<Define> {
    let rest = rest.trim_start();
    let (name, value) = match rest.find(char::is_whitespace) {
        Some(split) => (&rest[..split], rest[split..].trim()),
        None => (rest, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some(Define {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn substitute(line: &str, globals: &[Define], locals: &[Define]) -> String {
    globals
        .iter()
        .chain(locals)
        .fold(line.to_string(), |text, define| {
            if text.contains(define.name.as_str()) {
                text.replace(define.name.as_str(), &define.value)
            } else {
                text
            }
        })
}

/// Run directives and substitutions over one file.
///
/// Defines apply to the lines after them. Globals are substituted before
/// locals, each group in definition order. With `enabled == false` directive
/// lines are still blanked but nothing is defined or substituted.
pub fn preprocess(
    text: &str,
    state: &mut PreprocessorState,
    enabled: bool,
) -> Result<String, DialectAError> {
    let mut locals: Vec<Define> = Vec::new();
    let mut output = String::with_capacity(text.len());

    for source_line in split_lines(text) {
        let trimmed = source_line.text.trim_start();

        if trimmed.starts_with('#') {
            if enabled {
                let define = if let Some(rest) = trimmed.strip_prefix(GLOBAL_DEFINE) {
                    parse_define(rest).map(|d| (d, true))
                } else if let Some(rest) = trimmed.strip_prefix(DEFINE) {
                    parse_define(rest).map(|d| (d, false))
                } else {
                    None
                };

                if let Some((define, global)) = define {
                    if state.globals.len() + locals.len() >= MAX_DEFINES {
                        return Err(DialectAError::TooManyDefines {
                            line: source_line.number,
                            limit: MAX_DEFINES,
                        });
                    }
                    log_debug!("Preprocessor define",
                        "name" => define.name,
                        "global" => global,
                        "line" => source_line.number);
                    if global {
                        state.globals.push(define);
                    } else {
                        locals.push(define);
                    }
                }
            }
            output.push('\n');
            continue;
        }

        if enabled {
            output.push_str(&substitute(source_line.text, &state.globals, &locals));
        } else {
            output.push_str(source_line.text);
        }
        output.push('\n');
    }

    Ok(output)
}
