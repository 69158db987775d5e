//! Syntax tree for event/section documents
//!
//! Locations are plain `Span` values; nodes own their children and hold no
//! back-references.

use crate::utils::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub file_path: String,
    pub body: Vec<Block>,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    EventDecl(EventDecl),
    SectionBlock(SectionBlock),
}

impl Block {
    pub fn loc(&self) -> Span {
        match self {
            Block::EventDecl(event) => event.loc,
            Block::SectionBlock(section) => section.loc,
        }
    }

    /// Every line of text in the block with the span of its content
    pub fn text_lines(&self) -> Vec<(&str, Span)> {
        match self {
            Block::EventDecl(event) => event
                .lines
                .iter()
                .map(|line| match line {
                    EventLine::DialogueLine(l) => (l.text.as_str(), l.loc),
                    EventLine::TextLine(l) => (l.text.as_str(), l.loc),
                })
                .collect(),
            Block::SectionBlock(section) => section
                .lines
                .iter()
                .map(|l| (l.text.as_str(), l.loc))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDecl {
    pub name: String,
    pub lines: Vec<EventLine>,
    pub loc: Span,
}

impl EventDecl {
    pub fn dialogue_lines(&self) -> impl Iterator<Item = &DialogueLine> {
        self.lines.iter().filter_map(|line| match line {
            EventLine::DialogueLine(l) => Some(l),
            EventLine::TextLine(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventLine {
    DialogueLine(DialogueLine),
    TextLine(TextLine),
}

/// `：` line; `text` excludes the marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub text: String,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub loc: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionMarker {
    #[serde(rename = "＠")]
    At,
    #[serde(rename = "＄")]
    Dollar,
}

impl SectionMarker {
    pub fn from_char(marker: char) -> Option<Self> {
        match marker {
            '＠' => Some(SectionMarker::At),
            '＄' => Some(SectionMarker::Dollar),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            SectionMarker::At => '＠',
            SectionMarker::Dollar => '＄',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    pub marker: SectionMarker,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub separator: Separator,
    pub lines: Vec<TextLine>,
    pub loc: Span,
}
