use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an inline dialogue token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Text,
    CharSwitch,
    Surface,
    Balloon,
    Choice,
    Raise,
    Directive,
    Wait,
    Marker,
    Variable,
    Unknown,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Text => "text",
            TokenKind::CharSwitch => "charSwitch",
            TokenKind::Surface => "surface",
            TokenKind::Balloon => "balloon",
            TokenKind::Choice => "choice",
            TokenKind::Raise => "raise",
            TokenKind::Directive => "directive",
            TokenKind::Wait => "wait",
            TokenKind::Marker => "marker",
            TokenKind::Variable => "variable",
            TokenKind::Unknown => "unknown",
        }
    }

    /// Whether a token of this kind is user-facing content
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            TokenKind::Text | TokenKind::Variable | TokenKind::Choice | TokenKind::Surface
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lexical unit of an inline dialogue string
///
/// `raw` is the exact source slice and `offset` its byte position in the
/// dialogue string, so `&dialogue[token.offset..][..token.raw.len()] == token.raw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token_type: TokenKind,
    pub raw: String,
    /// Decoded payload: unescaped text, scope number, surface id, label, etc.
    pub value: String,
    pub offset: usize,
}

impl Token {
    pub fn new(
        token_type: TokenKind,
        raw: impl Into<String>,
        value: impl Into<String>,
        offset: usize,
    ) -> Self {
        Self {
            token_type,
            raw: raw.into(),
            value: value.into(),
            offset,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.token_type.is_visible()
    }
}
