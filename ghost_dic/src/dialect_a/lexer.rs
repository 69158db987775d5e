//! Tokenizer for brace-structured scripts
//!
//! Total: unterminated strings run to end of line, an unclosed block comment
//! runs to end of input and unrecognised characters become operator tokens.

use crate::utils::{split_lines, Span};

/// Multi-character operators, longest first
const OPERATORS: [&str; 19] = [
    "!_in_", "_in_", "==", "!=", ">=", "<=", "&&", "||", "+=", "-=", "*=", "/=", "%=", ":=", ",=",
    "++", "--", "<<", ">>",
];

pub const ASSIGNMENT_OPERATORS: [&str; 8] = ["=", "+=", "-=", "*=", "/=", "%=", ":=", ",="];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Number(String),
    /// String literal contents without the quotes
    Str(String),
    Op(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// Newline or `;`
    Separator,
}

impl TokenKind {
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(self, TokenKind::Ident(name) if name == word)
    }

    pub fn is_op(&self, op: &str) -> bool {
        matches!(self, TokenKind::Op(text) if text == op)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    pub kind: TokenKind,
    /// Source text of the token, quotes included
    pub text: String,
    pub span: Span,
}

impl LexToken {
    pub fn line(&self) -> usize {
        self.span.start.line
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || (!c.is_ascii() && !c.is_whitespace() && c != '\u{3000}')
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '.'
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\u{3000}'
}

struct LineLexer<'a> {
    chars: Vec<char>,
    line: usize,
    tokens: &'a mut Vec<LexToken>,
}

impl LineLexer<'_> {
    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let text: String = self.chars[start..end].iter().collect();
        self.tokens.push(LexToken {
            kind,
            text,
            span: Span::on_line(self.line, start, end),
        });
    }

    fn starts_with(&self, at: usize, pattern: &str) -> bool {
        let mut index = at;
        for expected in pattern.chars() {
            if self.chars.get(index) != Some(&expected) {
                return false;
            }
            index += 1;
        }
        true
    }

    /// Lex from `start`; returns true when the line ends inside a block comment
    fn run(&mut self, start: usize) -> bool {
        let mut i = start;
        let len = self.chars.len();

        while i < len {
            let c = self.chars[i];

            if is_blank(c) {
                i += 1;
                continue;
            }

            if self.starts_with(i, "//") {
                break;
            }

            if self.starts_with(i, "/*") {
                match close_comment(&self.chars, i + 2) {
                    Some(after) => {
                        i = after;
                        continue;
                    }
                    None => return true,
                }
            }

            if c == '"' || c == '\'' {
                let end = self.chars[i + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .map(|p| i + 1 + p);
                let (content_end, token_end) = match end {
                    Some(close) => (close, close + 1),
                    None => (len, len),
                };
                let value: String = self.chars[i + 1..content_end].iter().collect();
                self.push(TokenKind::Str(value), i, token_end);
                i = token_end;
                continue;
            }

            if c.is_ascii_digit() {
                let end = self.scan(i, |ch| ch.is_ascii_alphanumeric() || ch == '.');
                let text: String = self.chars[i..end].iter().collect();
                self.push(TokenKind::Number(text), i, end);
                i = end;
                continue;
            }

            if let Some(op) = OPERATORS.iter().find(|op| self.starts_with(i, op)) {
                let end = i + op.chars().count();
                self.push(TokenKind::Op(op.to_string()), i, end);
                i = end;
                continue;
            }

            if is_ident_start(c) {
                let end = self.scan(i, is_ident_continue);
                let text: String = self.chars[i..end].iter().collect();
                self.push(TokenKind::Ident(text), i, end);
                i = end;
                continue;
            }

            let kind = match c {
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Separator,
                other => TokenKind::Op(other.to_string()),
            };
            self.push(kind, i, i + 1);
            i += 1;
        }

        false
    }

    fn scan(&self, start: usize, accept: impl Fn(char) -> bool) -> usize {
        let mut end = start + 1;
        while end < self.chars.len() && accept(self.chars[end]) {
            end += 1;
        }
        end
    }
}

/// Index just past `*/`, searching from `from`
fn close_comment(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1))
        .find(|&i| chars[i] == '*' && chars[i + 1] == '/')
        .map(|i| i + 2)
}

pub fn lex(source: &str) -> Vec<LexToken> {
    let mut tokens = Vec::new();
    let mut in_comment = false;

    for source_line in split_lines(source) {
        let chars: Vec<char> = source_line.text.chars().collect();

        let start = if in_comment {
            match close_comment(&chars, 0) {
                Some(after) => after,
                None => continue,
            }
        } else {
            0
        };

        let mut lexer = LineLexer {
            chars,
            line: source_line.number,
            tokens: &mut tokens,
        };
        in_comment = lexer.run(start);

        let end = lexer.chars.len();
        tokens.push(LexToken {
            kind: TokenKind::Separator,
            text: String::new(),
            span: Span::on_line(source_line.number, end, end),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    #[test]
    fn test_function_tokens() {
        assert_eq!(
            kinds("OnBoot { \"hi\" }"),
            vec![
                ident("OnBoot"),
                TokenKind::LBrace,
                TokenKind::Str("hi".to_string()),
                TokenKind::RBrace,
                TokenKind::Separator,
            ]
        );
    }

    #[test]
    fn test_operators_longest_first() {
        assert_eq!(
            kinds("a == b += c--"),
            vec![
                ident("a"),
                TokenKind::Op("==".to_string()),
                ident("b"),
                TokenKind::Op("+=".to_string()),
                ident("c"),
                TokenKind::Op("--".to_string()),
                TokenKind::Separator,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("a // tail\n/* multi\nline */ b"),
            vec![
                ident("a"),
                TokenKind::Separator,
                TokenKind::Separator,
                ident("b"),
                TokenKind::Separator,
            ]
        );
    }

    #[test]
    fn test_comment_reopened_after_close() {
        assert_eq!(
            kinds("/* a\n*/ b /* c\n*/ d"),
            vec![
                TokenKind::Separator,
                ident("b"),
                TokenKind::Separator,
                ident("d"),
                TokenKind::Separator,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_line_end() {
        let tokens = lex("\"open\nnext");
        assert_eq!(tokens[0].kind, TokenKind::Str("open".to_string()));
        assert_eq!(tokens[2].kind, ident("next"));
        assert_eq!(tokens[2].line(), 1);
    }

    #[test]
    fn test_single_quotes_and_unicode_identifiers() {
        assert_eq!(
            kinds("挨拶 = 'やあ'"),
            vec![
                ident("挨拶"),
                TokenKind::Op("=".to_string()),
                TokenKind::Str("やあ".to_string()),
                TokenKind::Separator,
            ]
        );
    }

    #[test]
    fn test_spans_are_character_columns() {
        let tokens = lex("  \"あい\" x");
        assert_eq!(tokens[0].span, Span::on_line(0, 2, 6));
        assert_eq!(tokens[1].span, Span::on_line(0, 7, 8));
    }

    #[test]
    fn test_semicolon_is_separator() {
        assert_eq!(
            kinds("a; b"),
            vec![ident("a"), TokenKind::Separator, ident("b"), TokenKind::Separator]
        );
    }
}
