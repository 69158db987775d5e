//! Inline dialogue tokenizer
//!
//! Splits one dialogue string into text runs and control sequences. The
//! tokenizer is total: unrecognised commands and unterminated brackets become
//! `unknown` tokens, never errors. Concatenating the `raw` of every token
//! reproduces the input exactly.
//!
//! Recognised sequences:
//!
//! | Kind | Forms |
//! |---|---|
//! | charSwitch | `\0` `\1` `\h` `\u` `\p[n]` `\pN` |
//! | surface | `\s[id]` `\sN` |
//! | balloon | `\b[id]` `\bN` |
//! | choice | `\q[label,...]` `\__q[...]` |
//! | raise | `\![raise,...]` and the other raise/notify verbs |
//! | wait | `\w1`..`\w9` `\_w[ms]` `\__w[...]` |
//! | directive | other `\![...]`, `\_X`, `\f` `\i` `\j` ... with optional `[...]` |
//! | marker | `\n` `\n[...]` `\c` `\e` `\x` `\t` `\*` |
//! | variable | `%(name)` `$(name)` |
//!
//! `\\` and `\%` are escapes folded into the surrounding text.

use crate::config::constants::compile_time::inline::LARGE_DIALOGUE_THRESHOLD;
use crate::logging::codes;
use crate::model::{Token, TokenKind};
use crate::{log_debug, log_warning};

/// Raise/notify verbs and the argument index holding the event name
const RAISE_VERBS: &[(&str, usize)] = &[
    ("raise", 1),
    ("notify", 1),
    ("raiseother", 2),
    ("notifyother", 2),
    ("raiseplugin", 2),
    ("notifyplugin", 2),
    ("timerraise", 3),
    ("timernotify", 3),
    ("timerraiseother", 4),
    ("timerraiseplugin", 4),
];

/// Tokenize a dialogue string
pub fn tokenize(raw: &str) -> Vec<Token> {
    if raw.len() > LARGE_DIALOGUE_THRESHOLD {
        log_warning!(codes::inline::LARGE_DIALOGUE, "Tokenizing unusually large dialogue",
            "bytes" => raw.len(),
            "threshold" => LARGE_DIALOGUE_THRESHOLD);
    }

    let tokens = InlineLexer::new(raw).run();

    if let Some(first) = tokens.iter().find(|t| t.token_type == TokenKind::Unknown) {
        log_warning!(codes::inline::UNKNOWN_CONTROL_SEQUENCE, "Unknown control sequence in dialogue",
            "raw" => first.raw,
            "offset" => first.offset);
    }
    log_debug!("Tokenized dialogue", "tokens" => tokens.len());

    tokens
}

// ============================================================================
// BRACKET SCANNING
// ============================================================================

enum Bracket<'a> {
    Absent,
    Closed { end: usize, content: &'a str },
    Unterminated,
}

/// Scan a `[...]` group starting at byte `at`.
///
/// `"` toggles quoting and a backslash escapes the following character, so
/// neither a quoted nor an escaped `]` closes the group.
fn bracket_at(src: &str, at: usize) -> Bracket<'_> {
    let bytes = src.as_bytes();
    if bytes.get(at) != Some(&b'[') {
        return Bracket::Absent;
    }

    let mut i = at + 1;
    let mut quoted = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'"' => quoted = !quoted,
            b']' if !quoted => {
                return Bracket::Closed {
                    end: i + 1,
                    content: &src[at + 1..i],
                }
            }
            _ => {}
        }
        i += 1;
    }
    Bracket::Unterminated
}

/// Split bracket content into arguments on unquoted commas, removing
/// enclosing quotes and backslash escapes
fn split_args(content: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = content.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ (']' | '\\' | '"' | ',')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '"' => quoted = !quoted,
            ',' if !quoted => args.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    args.push(current);
    args
}

fn first_arg(content: &str) -> String {
    split_args(content).into_iter().next().unwrap_or_default()
}

// ============================================================================
// LEXER
// ============================================================================

struct InlineLexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    /// Start offset and unescaped value of the pending text run
    text: Option<(usize, String)>,
}

impl<'a> InlineLexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            text: None,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(ch) = self.peek_at(self.pos) {
            match ch {
                '\\' => self.backslash(),
                '%' | '$' if self.peek_at(self.pos + 1) == Some('(') => self.variable(),
                _ => {
                    self.push_text(ch.to_string(), ch.len_utf8());
                }
            }
        }
        self.flush_text();
        self.tokens
    }

    fn peek_at(&self, at: usize) -> Option<char> {
        self.src.get(at..).and_then(|rest| rest.chars().next())
    }

    fn push_text(&mut self, value: String, len: usize) {
        match &mut self.text {
            Some((_, pending)) => pending.push_str(&value),
            None => self.text = Some((self.pos, value)),
        }
        self.pos += len;
    }

    fn flush_text(&mut self) {
        if let Some((start, value)) = self.text.take() {
            let raw = &self.src[start..self.pos];
            self.tokens
                .push(Token::new(TokenKind::Text, raw, value, start));
        }
    }

    /// Emit a control token covering `self.pos..end`
    fn emit(&mut self, kind: TokenKind, end: usize, value: impl Into<String>) {
        self.flush_text();
        let start = self.pos;
        self.tokens
            .push(Token::new(kind, &self.src[start..end], value, start));
        self.pos = end;
    }

    /// Unknown token running to end of input
    fn emit_unterminated(&mut self) {
        let end = self.src.len();
        self.emit(TokenKind::Unknown, end, "");
    }

    /// Command taking a mandatory `[...]` at `at`
    fn bracketed(&mut self, at: usize, kind: TokenKind, value: impl FnOnce(&str) -> String) {
        match bracket_at(self.src, at) {
            Bracket::Closed { end, content } => {
                let value = value(content);
                self.emit(kind, end, value);
            }
            Bracket::Unterminated => self.emit_unterminated(),
            Bracket::Absent => self.emit(TokenKind::Unknown, at, ""),
        }
    }

    /// Command with an optional `[...]` at `at`; the value is the bracket content
    fn optionally_bracketed(&mut self, at: usize, kind: TokenKind) {
        match bracket_at(self.src, at) {
            Bracket::Closed { end, content } => {
                let content = content.to_string();
                self.emit(kind, end, content);
            }
            Bracket::Unterminated => self.emit_unterminated(),
            Bracket::Absent => self.emit(kind, at, ""),
        }
    }

    /// Command taking either `[...]` or a single digit at `at`
    fn bracket_or_digit(&mut self, at: usize, kind: TokenKind) {
        match self.peek_at(at) {
            Some('[') => self.bracketed(at, kind, |content| content.trim().to_string()),
            Some(d) if d.is_ascii_digit() => self.emit(kind, at + 1, d.to_string()),
            _ => self.emit(TokenKind::Unknown, at, ""),
        }
    }

    fn backslash(&mut self) {
        let cmd_at = self.pos + 1;
        let Some(cmd) = self.peek_at(cmd_at) else {
            // lone trailing backslash
            self.emit(TokenKind::Unknown, cmd_at, "");
            return;
        };
        let after = cmd_at + cmd.len_utf8();

        match cmd {
            '\\' | '%' => self.push_text(cmd.to_string(), 2),
            '0' | 'h' => self.emit(TokenKind::CharSwitch, after, "0"),
            '1' | 'u' => self.emit(TokenKind::CharSwitch, after, "1"),
            'p' => self.bracket_or_digit(after, TokenKind::CharSwitch),
            's' => self.bracket_or_digit(after, TokenKind::Surface),
            'b' => self.bracket_or_digit(after, TokenKind::Balloon),
            'q' => self.bracketed(after, TokenKind::Choice, first_arg),
            'w' => match self.peek_at(after) {
                Some(d @ '1'..='9') => self.emit(TokenKind::Wait, after + 1, d.to_string()),
                _ => self.emit(TokenKind::Unknown, after, ""),
            },
            '!' => self.exclamation(after),
            '_' => self.underscore(after),
            'n' | 'c' | 'e' | 'x' | 't' | '*' => self.optionally_bracketed(after, TokenKind::Marker),
            'f' | 'i' | 'j' | 'm' | '8' | '&' | 'a' | 'v' | '-' | '+' | '4' | '5' | '6' | '7'
            | 'C' => self.optionally_bracketed(after, TokenKind::Directive),
            _ => self.emit(TokenKind::Unknown, after, ""),
        }
    }

    /// `\![...]`: raise family or generic directive
    fn exclamation(&mut self, at: usize) {
        match bracket_at(self.src, at) {
            Bracket::Closed { end, content } => {
                let args = split_args(content);
                let verb = args.first().map(|v| v.trim().to_ascii_lowercase());
                let raise_index = verb.as_deref().and_then(|verb| {
                    RAISE_VERBS
                        .iter()
                        .find(|(name, _)| *name == verb)
                        .map(|(_, index)| *index)
                });

                match raise_index {
                    Some(index) => {
                        let event = args.get(index).cloned().unwrap_or_default();
                        self.emit(TokenKind::Raise, end, event);
                    }
                    None => {
                        let content = content.to_string();
                        self.emit(TokenKind::Directive, end, content);
                    }
                }
            }
            Bracket::Unterminated => self.emit_unterminated(),
            Bracket::Absent => self.emit(TokenKind::Unknown, at, ""),
        }
    }

    /// `\_X` and `\__X` families
    fn underscore(&mut self, at: usize) {
        let Some(sub) = self.peek_at(at) else {
            self.emit(TokenKind::Unknown, at, "");
            return;
        };
        let after = at + sub.len_utf8();

        match sub {
            '_' => self.double_underscore(after),
            'w' => self.bracketed(after, TokenKind::Wait, |content| content.trim().to_string()),
            'a' | 'b' | 'l' | 'm' | 'n' | 'q' | 's' | 'u' | 'v' | 'V' | '?' | '!' | '+' | '@' => {
                self.optionally_bracketed(after, TokenKind::Directive)
            }
            _ => self.emit(TokenKind::Unknown, at, ""),
        }
    }

    fn double_underscore(&mut self, at: usize) {
        match self.peek_at(at) {
            Some('q') => self.bracketed(at + 1, TokenKind::Choice, first_arg),
            Some('w') => self.bracketed(at + 1, TokenKind::Wait, |content| content.to_string()),
            Some('c') | Some('t') => self.optionally_bracketed(at + 1, TokenKind::Directive),
            // `\_` alone is the unknown part; the second underscore is text
            _ => self.emit(TokenKind::Unknown, at - 1, ""),
        }
    }

    /// `%(name)` / `$(name)`, parentheses may nest
    fn variable(&mut self) {
        let bytes = self.src.as_bytes();
        let open = self.pos + 1;
        let mut depth = 0usize;
        let mut i = open;

        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        let name = self.src[open + 1..i].trim().to_string();
                        self.emit(TokenKind::Variable, i + 1, name);
                        return;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        self.emit_unterminated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.token_type).collect()
    }

    fn reassemble(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.raw.as_str()).collect()
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "plain text only",
            r"\h\s[5]こんにちは。\w9\u\s10ふむ。\e",
            r"\![raise,OnTest,a,b]\q[はい,OnYes]\q[いいえ,OnNo]",
            r"\_w[300]\__w[animation,400]\_q全部\_q\n[half]\x",
            r"%(username)さん、$(name)だよ\\ 100\%",
            r"\z\_Z\__z trailing\",
            r"\s[5 unterminated",
            "%(never closed",
            r#"\q["quoted ] label",OnX]\![open,"file,name"]"#,
            "改行\r\nあり",
        ];
        for sample in samples {
            let tokens = tokenize(sample);
            assert_eq!(reassemble(&tokens), sample, "round trip failed for {:?}", sample);
        }
    }

    /// Strings drawn mostly from control-sequence characters
    fn dialogue_strategy() -> impl Strategy<Value = String> {
        let alphabet = vec![
            '\\', '[', ']', '"', '(', ')', '$', '%', '_', '!', ',', 'h', 'u', 's', 'w', 'q', 'n',
            'e', '0', '1', '5', '9', 'a', ' ', '\n', 'あ', 'い', '。', '😀',
        ];
        prop::collection::vec(prop::sample::select(alphabet), 0..64)
            .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn test_round_trip_holds_for_control_heavy_input(source in dialogue_strategy()) {
            let tokens = tokenize(&source);
            prop_assert_eq!(reassemble(&tokens), source);
        }

        #[test]
        fn test_offsets_are_contiguous(source in dialogue_strategy()) {
            let mut expected = 0;
            for token in tokenize(&source) {
                prop_assert_eq!(token.offset, expected);
                let end = token.offset + token.raw.len();
                prop_assert_eq!(&source[token.offset..end], token.raw.as_str());
                expected += token.raw.len();
            }
            prop_assert_eq!(expected, source.len());
        }

        #[test]
        fn test_round_trip_holds_for_any_text(source in "\\PC*") {
            prop_assert_eq!(reassemble(&tokenize(&source)), source);
        }
    }

    #[test]
    fn test_offsets_are_byte_positions() {
        let source = r"あい\s[3]う\e";
        let tokens = tokenize(source);

        let mut last = 0;
        for token in &tokens {
            assert!(token.offset >= last);
            assert_eq!(&source[token.offset..token.offset + token.raw.len()], token.raw);
            last = token.offset;
        }
        assert_eq!(tokens[1].offset, "あい".len());
    }

    #[test]
    fn test_text_runs_are_not_split() {
        let tokens = tokenize(r"a\\b\%c");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenKind::Text);
        assert_eq!(tokens[0].raw, r"a\\b\%c");
        assert_eq!(tokens[0].value, r"a\b%c");
    }

    #[test]
    fn test_scope_and_surface_values() {
        let tokens = tokenize(r"\h\s[10]\u\s0\p[2]\p3\b[-1]\b2");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::CharSwitch,
                TokenKind::Surface,
                TokenKind::CharSwitch,
                TokenKind::Surface,
                TokenKind::CharSwitch,
                TokenKind::CharSwitch,
                TokenKind::Balloon,
                TokenKind::Balloon,
            ]
        );
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["0", "10", "1", "0", "2", "3", "-1", "2"]);
    }

    #[test]
    fn test_choice_and_raise_values() {
        let tokens = tokenize(r#"\q["Yes, please",OnYes]\__q[OnNo]no\__q\![raise,OnBoot,1]"#);
        assert_eq!(tokens[0].token_type, TokenKind::Choice);
        assert_eq!(tokens[0].value, "Yes, please");
        assert_eq!(tokens[1].token_type, TokenKind::Choice);
        assert_eq!(tokens[1].value, "OnNo");
        assert_eq!(tokens[2].token_type, TokenKind::Text);
        assert_eq!(tokens[3].token_type, TokenKind::Unknown);
        assert_eq!(tokens[3].raw, r"\__q");
        assert_eq!(tokens[4].token_type, TokenKind::Raise);
        assert_eq!(tokens[4].value, "OnBoot");

        let tokens = tokenize(r"\![timerraise,1000,1,OnTimer]\![raiseother,Emily,OnHello]");
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["OnTimer", "OnHello"]);
    }

    #[test]
    fn test_directives_waits_and_markers() {
        let tokens = tokenize(r"\![set,wallpaper,x.png]\_w[250]\w5\_s\f[bold,1]\n\n[half]\c\e\-");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Directive,
                TokenKind::Wait,
                TokenKind::Wait,
                TokenKind::Directive,
                TokenKind::Directive,
                TokenKind::Marker,
                TokenKind::Marker,
                TokenKind::Marker,
                TokenKind::Marker,
                TokenKind::Directive,
            ]
        );
        assert_eq!(tokens[0].value, "set,wallpaper,x.png");
        assert_eq!(tokens[1].value, "250");
        assert_eq!(tokens[2].value, "5");
        assert_eq!(tokens[6].value, "half");
        assert!(tokens[7].raw.starts_with(r"\c"));
    }

    #[test]
    fn test_variables() {
        let tokens = tokenize("%(user)と$(名前)、%");
        assert_eq!(tokens[0].token_type, TokenKind::Variable);
        assert_eq!(tokens[0].value, "user");
        assert_eq!(tokens[2].token_type, TokenKind::Variable);
        assert_eq!(tokens[2].value, "名前");
        assert_eq!(tokens[3].token_type, TokenKind::Text);
        assert_eq!(tokens[3].value, "、%");
    }

    #[test]
    fn test_unknown_command_keeps_following_text() {
        let tokens = tokenize(r"\zabc");
        assert_eq!(kinds(&tokens), vec![TokenKind::Unknown, TokenKind::Text]);
        assert_eq!(tokens[0].raw, r"\z");
        assert_eq!(tokens[1].raw, "abc");
    }

    #[test]
    fn test_unterminated_bracket_runs_to_end() {
        let tokens = tokenize(r"hi\s[5 and more");
        assert_eq!(kinds(&tokens), vec![TokenKind::Text, TokenKind::Unknown]);
        assert_eq!(tokens[1].raw, r"\s[5 and more");

        let tokens = tokenize("$(open");
        assert_eq!(kinds(&tokens), vec![TokenKind::Unknown]);
    }

    #[test]
    fn test_wait_only_is_invisible() {
        let tokens = tokenize(r"\w9\w9\e");
        assert!(!crate::model::is_visible(&tokens));
        assert!(crate::model::is_visible(&tokenize("text")));
    }
}
