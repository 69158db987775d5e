use super::token::Token;
use crate::inline;
use serde::{Deserialize, Serialize};

/// One alternative line of output text plus its inline tokens
///
/// Lines are zero-based and refer to the dialect source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    pub raw_text: String,
    pub tokens: Vec<Token>,
    pub start_line: usize,
    pub end_line: usize,
}

impl Dialogue {
    /// Tokenize `raw_text` and build a dialogue spanning the given lines
    pub fn from_text(raw_text: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        let raw_text = raw_text.into();
        let tokens = inline::tokenize(&raw_text);
        Self {
            raw_text,
            tokens,
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Single-line dialogue
    pub fn on_line(raw_text: impl Into<String>, line: usize) -> Self {
        Self::from_text(raw_text, line, line)
    }

    pub fn is_visible(&self) -> bool {
        is_visible(&self.tokens)
    }
}

/// Visibility predicate: true iff at least one token is text, variable,
/// choice or surface
pub fn is_visible(tokens: &[Token]) -> bool {
    tokens.iter().any(Token::is_visible)
}

/// A named unit of dialogue content, one per declaration site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicFunction {
    pub name: String,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub dialogues: Vec<Dialogue>,
}

impl DicFunction {
    pub fn new(
        name: impl Into<String>,
        file_path: impl Into<String>,
        start_line: usize,
        end_line: usize,
        dialogues: Vec<Dialogue>,
    ) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            start_line,
            end_line: end_line.max(start_line),
            dialogues,
        }
    }

    /// Dialogues that pass the visibility predicate
    pub fn visible_dialogues(&self) -> impl Iterator<Item = &Dialogue> {
        self.dialogues.iter().filter(|d| d.is_visible())
    }
}
