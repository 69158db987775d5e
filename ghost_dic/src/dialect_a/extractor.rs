//! Display-output extraction from function bodies
//!
//! Only standalone string-literal statements are output. Consecutive ones
//! in a block join into one dialogue until a control-flow boundary; each
//! nested body starts its own run. A run with no visible content is carried
//! into the next visible run of the same block.

use super::ast::{FunctionDecl, Statement, StringLiteral};
use crate::model::Dialogue;

#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    start_line: usize,
    end_line: usize,
}

impl Fragment {
    fn from_literal(literal: &StringLiteral) -> Self {
        Self {
            text: literal.value.clone(),
            start_line: literal.loc.start.line,
            end_line: literal.loc.end.line,
        }
    }

    fn append(&mut self, other: Fragment) {
        self.text.push_str(&other.text);
        self.end_line = other.end_line;
    }
}

struct BlockState<'o> {
    merge_invisible: bool,
    run: Option<Fragment>,
    carry: Option<Fragment>,
    output: &'o mut Vec<Dialogue>,
}

impl BlockState<'_> {
    fn push_literal(&mut self, literal: &StringLiteral) {
        let fragment = Fragment::from_literal(literal);
        match self.run.as_mut() {
            Some(run) => run.append(fragment),
            None => self.run = Some(fragment),
        }
    }

    /// Close the current run at a boundary
    fn flush(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };

        let dialogue = Dialogue::from_text(run.text.as_str(), run.start_line, run.end_line);
        if !self.merge_invisible {
            self.output.push(dialogue);
            return;
        }

        if dialogue.is_visible() {
            match self.carry.take() {
                Some(mut carry) => {
                    carry.append(run);
                    self.output.push(Dialogue::from_text(
                        carry.text,
                        carry.start_line,
                        carry.end_line,
                    ));
                }
                None => self.output.push(dialogue),
            }
        } else {
            match self.carry.as_mut() {
                Some(carry) => carry.append(run),
                None => self.carry = Some(run),
            }
        }
    }
}

fn extract_block(body: &[Statement], merge_invisible: bool, output: &mut Vec<Dialogue>) {
    let mut state = BlockState {
        merge_invisible,
        run: None,
        carry: None,
        output,
    };

    for statement in body {
        match statement {
            Statement::StringLiteral(literal) => state.push_literal(literal),
            Statement::IfStmt(stmt) => {
                state.flush();
                for branch in &stmt.branches {
                    extract_block(&branch.body, merge_invisible, state.output);
                }
                if let Some(alternate) = &stmt.alternate {
                    extract_block(alternate, merge_invisible, state.output);
                }
            }
            Statement::Loop(stmt) => {
                state.flush();
                extract_block(&stmt.body, merge_invisible, state.output);
            }
            Statement::Switch(stmt) => {
                state.flush();
                extract_block(&stmt.body, merge_invisible, state.output);
            }
            Statement::Block { body, .. } => {
                state.flush();
                extract_block(body, merge_invisible, state.output);
            }
            Statement::OutputSeparator { .. } => state.flush(),
            Statement::FunctionDecl(_)
            | Statement::Assignment(_)
            | Statement::CallExpr(_)
            | Statement::Jump(_)
            | Statement::Expression(_) => {}
        }
    }

    // a carry with nothing visible after it is dropped
    state.flush();
}

/// Dialogues of one function in source order
pub fn extract_dialogues(function: &FunctionDecl, merge_invisible: bool) -> Vec<Dialogue> {
    let mut output = Vec::new();
    extract_block(&function.body, merge_invisible, &mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect_a::{lexer::lex, parser::parse};

    fn dialogues(source: &str, merge_invisible: bool) -> Vec<Dialogue> {
        let program = parse(&lex(source)).unwrap();
        let function = program.functions().next().unwrap();
        extract_dialogues(function, merge_invisible)
    }

    fn texts(source: &str) -> Vec<String> {
        dialogues(source, true)
            .into_iter()
            .map(|d| d.raw_text)
            .collect()
    }

    #[test]
    fn test_consecutive_literals_concatenate() {
        let result = texts("fn { \"a\" \"b\" }");
        assert_eq!(result.len(), 1);
        assert!(result[0].contains('a') && result[0].contains('b'));
    }

    #[test]
    fn test_multiline_run_spans_lines() {
        let result = dialogues("fn {\n\"a\"\nx = 1\n\"b\"\n}", true);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].raw_text, "ab");
        assert_eq!(result[0].start_line, 1);
        assert_eq!(result[0].end_line, 3);
    }

    #[test]
    fn test_branches_are_separate() {
        assert_eq!(
            texts("fn { if COND { \"a\" } else { \"b\" } }"),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_branch_does_not_merge_with_following() {
        assert_eq!(
            texts("fn {\n\"before\"\nif x { \"in\" }\n\"after\"\n}"),
            vec!["before", "in", "after"]
        );
    }

    #[test]
    fn test_arguments_and_assignments_not_extracted() {
        let result = texts("fn {\nname = \"hidden\"\nsay(\"also hidden\")\nif x == \"cond\" { \"shown\" }\n}");
        assert_eq!(result, vec!["shown"]);
    }

    #[test]
    fn test_invisible_fragment_merges_forward() {
        let result = dialogues("fn {\n\"\\w9\"\nif c { \"a\" }\n\"b\"\n}", true);

        let texts: Vec<_> = result.iter().map(|d| d.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["a", "\\w9b"]);
        assert_eq!(result[1].start_line, 1);
        assert_eq!(result[1].end_line, 3);
    }

    #[test]
    fn test_trailing_invisible_fragment_dropped() {
        assert_eq!(texts("fn { \"hi\"\n--\n\"\\e\" }"), vec!["hi"]);
    }

    #[test]
    fn test_invisible_fragment_kept_when_merging_disabled() {
        let result = dialogues("fn { \"hi\"\n--\n\"\\e\" }", false);
        assert_eq!(result.len(), 2);
        assert!(!result[1].is_visible());
    }

    #[test]
    fn test_loops_and_blocks_are_boundaries() {
        assert_eq!(
            texts("fn {\n\"a\"\nwhile x { \"b\" }\n{ \"c\" }\n\"d\"\n}"),
            vec!["a", "b", "c", "d"]
        );
    }
}
