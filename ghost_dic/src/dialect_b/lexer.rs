//! Line classifier for event/section marker blocks

use crate::config::runtime::DialectBPreferences;
use crate::utils::{char_width, split_lines};

pub const EVENT_MARKER: char = '＊';
pub const DIALOGUE_MARKER: char = '：';
pub const SECTION_MARKERS: [char; 2] = ['＠', '＄'];
pub const CONTINUATION_PREFIX: char = '→';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    EventOpen,
    SectionOpen,
    DialogueLine,
    Text,
}

/// One classified source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineToken {
    pub kind: LineKind,
    pub line: usize,
    /// Character width of the stripped continuation prefix
    pub column: usize,
    /// Character width of the line after prefix stripping
    pub length: usize,
    /// Leading marker for event, section and dialogue lines
    pub marker: Option<char>,
    /// Line content after the marker; the whole line for text lines
    pub value: String,
    /// Line after prefix stripping, marker included
    pub raw: String,
}

impl LineToken {
    /// Column where `value` starts
    pub fn value_column(&self) -> usize {
        self.column + usize::from(self.marker.is_some())
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with("//") || line.starts_with('＃')
}

fn classify(line: &str) -> (LineKind, Option<char>, &str) {
    let mut chars = line.chars();
    match chars.next() {
        Some(EVENT_MARKER) => (LineKind::EventOpen, Some(EVENT_MARKER), chars.as_str()),
        Some(marker) if SECTION_MARKERS.contains(&marker) => {
            (LineKind::SectionOpen, Some(marker), chars.as_str())
        }
        Some(DIALOGUE_MARKER) => (
            LineKind::DialogueLine,
            Some(DIALOGUE_MARKER),
            chars.as_str(),
        ),
        _ => (LineKind::Text, None, line),
    }
}

pub fn lex(source: &str, preferences: &DialectBPreferences) -> Vec<LineToken> {
    let mut tokens = Vec::new();

    for source_line in split_lines(source) {
        let (column, line) = match source_line.text.strip_prefix(CONTINUATION_PREFIX) {
            Some(rest) if preferences.strip_continuation_prefix => (1, rest),
            _ => (0, source_line.text),
        };

        if line.trim().is_empty() || is_comment(line) {
            continue;
        }

        let (kind, marker, rest) = classify(line);
        let value = match kind {
            LineKind::EventOpen | LineKind::SectionOpen => rest.trim(),
            LineKind::DialogueLine | LineKind::Text => rest,
        };

        tokens.push(LineToken {
            kind,
            line: source_line.number,
            column,
            length: char_width(line),
            marker,
            value: value.to_string(),
            raw: line.to_string(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LineKind> {
        lex(source, &DialectBPreferences::default())
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            kinds("＊OnBoot\n：hello\nplain\n＠words\n＄\n"),
            vec![
                LineKind::EventOpen,
                LineKind::DialogueLine,
                LineKind::Text,
                LineKind::SectionOpen,
                LineKind::SectionOpen,
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_dropped() {
        assert_eq!(kinds("// note\n＃ note\n   \n\n：x"), vec![LineKind::DialogueLine]);
    }

    #[test]
    fn test_continuation_prefix_stripped() {
        let tokens = lex("→＊OnSecond\n→//comment", &DialectBPreferences::default());

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, LineKind::EventOpen);
        assert_eq!(tokens[0].column, 1);
        assert_eq!(tokens[0].value, "OnSecond");
        assert_eq!(tokens[0].length, 9);
        assert_eq!(tokens[0].value_column(), 2);
    }

    #[test]
    fn test_prefix_kept_when_disabled() {
        let preferences = DialectBPreferences {
            strip_continuation_prefix: false,
            accept_fullwidth_assignment: true,
        };
        let tokens = lex("→＊OnSecond", &preferences);
        assert_eq!(tokens[0].kind, LineKind::Text);
        assert_eq!(tokens[0].column, 0);
    }

    #[test]
    fn test_section_marker_and_name() {
        let tokens = lex("＠ 挨拶 ", &DialectBPreferences::default());
        assert_eq!(tokens[0].marker, Some('＠'));
        assert_eq!(tokens[0].value, "挨拶");
    }
}
