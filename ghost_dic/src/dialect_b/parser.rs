//! Block parser
//!
//! The open block is a value threaded through a fold over the line tokens.
//! An event or section line closes whatever is open; content lines attach
//! to the open block or are dropped when nothing is open.

use super::ast::{
    Block, DialogueLine, EventDecl, EventLine, Program, SectionBlock, SectionMarker, Separator,
    TextLine,
};
use super::lexer::{LineKind, LineToken};
use crate::utils::{char_width, Position, Span};

enum OpenBlock {
    None,
    OpenEvent(EventDecl),
    OpenSection(SectionBlock),
}

impl OpenBlock {
    fn close_into(self, body: &mut Vec<Block>) {
        match self {
            OpenBlock::None => {}
            OpenBlock::OpenEvent(event) => body.push(Block::EventDecl(event)),
            OpenBlock::OpenSection(section) => body.push(Block::SectionBlock(section)),
        }
    }
}

/// Span of the token's whole line, ending at the token length
fn block_loc(token: &LineToken) -> Span {
    Span::new(
        Position::new(token.line, token.column),
        Position::new(token.line, token.length.max(token.column)),
    )
}

/// Span of a content string starting at `column`
fn content_loc(line: usize, column: usize, text: &str) -> Span {
    Span::on_line(line, column, column + char_width(text))
}

fn extend_end(loc: &mut Span, token: &LineToken) {
    loc.end = Position::new(token.line, token.length);
}

fn step(mut body: Vec<Block>, open: OpenBlock, token: &LineToken) -> (Vec<Block>, OpenBlock) {
    let open = match token.kind {
        LineKind::EventOpen => {
            open.close_into(&mut body);
            OpenBlock::OpenEvent(EventDecl {
                name: token.value.clone(),
                lines: Vec::new(),
                loc: block_loc(token),
            })
        }
        LineKind::SectionOpen => {
            open.close_into(&mut body);
            let marker = token
                .marker
                .and_then(SectionMarker::from_char)
                .unwrap_or(SectionMarker::At);
            OpenBlock::OpenSection(SectionBlock {
                separator: Separator {
                    marker,
                    name: token.value.clone(),
                },
                lines: Vec::new(),
                loc: block_loc(token),
            })
        }
        LineKind::DialogueLine => match open {
            OpenBlock::OpenEvent(mut event) => {
                event.lines.push(EventLine::DialogueLine(DialogueLine {
                    text: token.value.clone(),
                    loc: content_loc(token.line, token.value_column(), &token.value),
                }));
                extend_end(&mut event.loc, token);
                OpenBlock::OpenEvent(event)
            }
            // Only meaningful in an event; inside a section the raw line is kept as text
            OpenBlock::OpenSection(mut section) => {
                section.lines.push(TextLine {
                    text: token.raw.clone(),
                    loc: content_loc(token.line, token.column, &token.raw),
                });
                extend_end(&mut section.loc, token);
                OpenBlock::OpenSection(section)
            }
            OpenBlock::None => OpenBlock::None,
        },
        LineKind::Text => {
            let line = TextLine {
                text: token.value.clone(),
                loc: content_loc(token.line, token.column, &token.value),
            };
            match open {
                OpenBlock::OpenEvent(mut event) => {
                    event.lines.push(EventLine::TextLine(line));
                    extend_end(&mut event.loc, token);
                    OpenBlock::OpenEvent(event)
                }
                OpenBlock::OpenSection(mut section) => {
                    section.lines.push(line);
                    extend_end(&mut section.loc, token);
                    OpenBlock::OpenSection(section)
                }
                OpenBlock::None => OpenBlock::None,
            }
        }
    };
    (body, open)
}

pub fn parse(file_path: &str, tokens: &[LineToken]) -> Program {
    let (mut body, open) = tokens
        .iter()
        .fold((Vec::new(), OpenBlock::None), |(body, open), token| {
            step(body, open, token)
        });
    open.close_into(&mut body);

    let loc = match (body.first(), body.last()) {
        (Some(first), Some(last)) => first.loc().merge(last.loc()),
        _ => Span::default(),
    };

    Program {
        file_path: file_path.to_string(),
        body,
        loc,
    }
}
