//! Line lexer for colon-delimited entries
//!
//! Two states, `Normal` and `InCrypt`. The lexer only marks crypt region
//! boundaries; entries inside a region are still emitted and the parser
//! decides what to discard.

use crate::config::runtime::DialectCPreferences;
use crate::utils::{find_unquoted, split_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Normal,
    InCrypt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// A line with an unquoted colon at byte `colon`
    Entry {
        line: usize,
        text: &'a str,
        colon: usize,
    },
    CryptStart {
        line: usize,
    },
    CryptEnd {
        line: usize,
    },
}

impl LineToken<'_> {
    pub fn line(&self) -> usize {
        match self {
            LineToken::Entry { line, .. }
            | LineToken::CryptStart { line }
            | LineToken::CryptEnd { line } => *line,
        }
    }
}

/// Classify every line of `source`
pub fn lex<'a>(source: &'a str, preferences: &DialectCPreferences) -> Vec<LineToken<'a>> {
    let mut state = LexState::Normal;
    let mut tokens = Vec::new();

    for line in split_lines(source) {
        let trimmed = line.text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Sentinels win over entry detection even though they contain a colon
        if trimmed == preferences.crypt_open {
            if state == LexState::Normal {
                tokens.push(LineToken::CryptStart { line: line.number });
                state = LexState::InCrypt;
            }
            continue;
        }
        if trimmed == preferences.crypt_close {
            if state == LexState::InCrypt {
                tokens.push(LineToken::CryptEnd { line: line.number });
                state = LexState::Normal;
            }
            continue;
        }

        if let Some(colon) = find_unquoted(line.text, ':') {
            tokens.push(LineToken::Entry {
                line: line.number,
                text: line.text,
                colon,
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn prefs() -> DialectCPreferences {
        DialectCPreferences {
            crypt_open: ":crypt".to_string(),
            crypt_close: ":endcrypt".to_string(),
            strip_variant_quotes: true,
        }
    }

    #[test]
    fn test_blank_comment_and_colonless_lines_dropped() {
        let tokens = lex("\n# comment : here\n   \nno colon\nname : v", &prefs());
        assert_eq!(tokens.len(), 1);
        assert_matches!(tokens[0], LineToken::Entry { line: 4, colon: 5, .. });
    }

    #[test]
    fn test_crypt_markers_only_on_transition() {
        let source = ":endcrypt\n:crypt\n  :crypt  \na : 1\n:endcrypt\n:endcrypt";
        let tokens = lex(source, &prefs());

        assert_eq!(
            tokens,
            vec![
                LineToken::CryptStart { line: 1 },
                LineToken::Entry {
                    line: 3,
                    text: "a : 1",
                    colon: 2
                },
                LineToken::CryptEnd { line: 4 },
            ]
        );
    }

    #[test]
    fn test_mixed_terminators() {
        let tokens = lex("a : 1\r\nb : 2\rc : 3", &prefs());
        let lines: Vec<_> = tokens.iter().map(LineToken::line).collect();
        assert_eq!(lines, vec![0, 1, 2]);
    }
}
