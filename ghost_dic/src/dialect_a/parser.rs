//! Recursive-descent parser over the token vector
//!
//! Statements end at a separator or at the enclosing `}`. Conditions, loop
//! headers and call arguments are kept as opaque expressions.

use super::ast::{
    Assignment, CallExpr, Expr, FunctionDecl, IfBranch, IfStmt, JumpStmt, LoopKind, LoopStmt,
    Program, Statement, StringLiteral, SwitchStmt,
};
use super::lexer::{LexToken, TokenKind, ASSIGNMENT_OPERATORS};
use super::DialectAError;
use crate::config::constants::compile_time::dialect_a::MAX_BLOCK_DEPTH;
use crate::utils::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Headers run up to the `{` that opens the body, across separators
    AtBrace,
    AtStatementEnd,
}

fn is_statement_end(kind: Option<&TokenKind>) -> bool {
    matches!(kind, None | Some(TokenKind::Separator) | Some(TokenKind::RBrace))
}

/// Opaque expression over a token run; separators inside it are ignored
fn make_expr(tokens: &[LexToken]) -> Expr {
    let significant: Vec<&LexToken> = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Separator)
        .collect();

    let (first, last) = match (significant.first(), significant.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Expr::default(),
    };

    Expr {
        text: significant
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        literals: significant
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Str(value) => Some(StringLiteral {
                    value: value.clone(),
                    loc: t.span,
                }),
                _ => None,
            })
            .collect(),
        loc: first.span.merge(last.span),
    }
}

fn unexpected(expected: &str, token: &LexToken) -> DialectAError {
    let found = if token.text.is_empty() {
        "end of line".to_string()
    } else {
        token.text.clone()
    };
    DialectAError::UnexpectedToken {
        expected: expected.to_string(),
        found,
        line: token.line(),
    }
}

pub struct Parser<'a> {
    tokens: &'a [LexToken],
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [LexToken]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a LexToken> {
        self.tokens.get(self.position)
    }

    fn kind_at(&self, index: usize) -> Option<&'a TokenKind> {
        self.tokens.get(index).map(|t| &t.kind)
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map(LexToken::line).unwrap_or(0)
    }

    fn skip_separators(&mut self) {
        while self.kind_at(self.position) == Some(&TokenKind::Separator) {
            self.position += 1;
        }
    }

    /// Index of the bracket closing the one at `open`, if it closes before any brace
    fn matching(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for index in open..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(index);
                    }
                }
                TokenKind::LBrace | TokenKind::RBrace => return None,
                _ => {}
            }
        }
        None
    }

    pub fn parse_program(&mut self) -> Result<Program, DialectAError> {
        let mut body = Vec::new();

        loop {
            self.skip_separators();
            let Some(token) = self.peek() else {
                break;
            };
            match &token.kind {
                TokenKind::Ident(name) => {
                    self.position += 1;
                    body.push(Statement::FunctionDecl(
                        self.function_decl(name.clone(), token.span)?,
                    ));
                }
                TokenKind::RBrace => {
                    return Err(DialectAError::UnmatchedDelimiter {
                        delimiter: '}',
                        line: token.line(),
                    })
                }
                _ => return Err(unexpected("function name", token)),
            }
        }

        Ok(Program { body })
    }

    fn function_decl(&mut self, name: String, start: Span) -> Result<FunctionDecl, DialectAError> {
        let mut options = Vec::new();

        self.skip_separators();
        if self.kind_at(self.position).is_some_and(|k| k.is_op(":")) {
            self.position += 1;
            while let Some(token) = self.peek() {
                match &token.kind {
                    TokenKind::LBrace => break,
                    TokenKind::Ident(option) => options.push(option.clone()),
                    _ => {}
                }
                self.position += 1;
            }
        }

        let (body, loc) = self.block("function body")?;
        Ok(FunctionDecl {
            name,
            options,
            body,
            loc: start.merge(loc),
        })
    }

    /// `{ statement* }` starting at the cursor
    fn block(&mut self, context: &str) -> Result<(Vec<Statement>, Span), DialectAError> {
        self.skip_separators();
        let expected = format!("'{{' to open {}", context);
        let open = match self.peek() {
            Some(token) if token.kind == TokenKind::LBrace => token,
            Some(token) => return Err(unexpected(&expected, token)),
            None => {
                return Err(DialectAError::UnexpectedEndOfInput {
                    expected,
                    line: self.last_line(),
                })
            }
        };

        if self.depth >= MAX_BLOCK_DEPTH {
            return Err(DialectAError::NestingTooDeep {
                line: open.line(),
                limit: MAX_BLOCK_DEPTH,
            });
        }

        self.position += 1;
        self.depth += 1;
        let mut body = Vec::new();

        loop {
            self.skip_separators();
            match self.peek() {
                None => {
                    return Err(DialectAError::UnexpectedEndOfInput {
                        expected: format!("'}}' to close {}", context),
                        line: open.line(),
                    })
                }
                Some(token) if token.kind == TokenKind::RBrace => {
                    self.position += 1;
                    self.depth -= 1;
                    return Ok((body, open.span.merge(token.span)));
                }
                Some(_) => body.push(self.statement()?),
            }
        }
    }

    fn statement(&mut self) -> Result<Statement, DialectAError> {
        let Some(token) = self.peek() else {
            return Err(DialectAError::UnexpectedEndOfInput {
                expected: "statement".to_string(),
                line: self.last_line(),
            });
        };

        match &token.kind {
            TokenKind::LBrace => {
                let (body, loc) = self.block("block")?;
                Ok(Statement::Block { body, loc })
            }
            TokenKind::Ident(word) => match word.as_str() {
                "if" => {
                    self.position += 1;
                    self.if_stmt(token.span).map(Statement::IfStmt)
                }
                "switch" => {
                    self.position += 1;
                    let subject = self.expression(Stop::AtBrace);
                    let (body, loc) = self.block("switch body")?;
                    Ok(Statement::Switch(SwitchStmt {
                        subject,
                        body,
                        loc: token.span.merge(loc),
                    }))
                }
                "return" | "break" | "continue" => {
                    self.position += 1;
                    let value = if is_statement_end(self.kind_at(self.position)) {
                        None
                    } else {
                        Some(self.expression(Stop::AtStatementEnd))
                    };
                    let loc = value
                        .as_ref()
                        .map_or(token.span, |v| token.span.merge(v.loc));
                    Ok(Statement::Jump(JumpStmt {
                        keyword: word.clone(),
                        value,
                        loc,
                    }))
                }
                other => match LoopKind::from_keyword(other) {
                    Some(kind) => {
                        self.position += 1;
                        let header = self.expression(Stop::AtBrace);
                        let (body, loc) = self.block("loop body")?;
                        Ok(Statement::Loop(LoopStmt {
                            kind,
                            header,
                            body,
                            loc: token.span.merge(loc),
                        }))
                    }
                    None => Ok(self.simple_statement()),
                },
            },
            _ => Ok(self.simple_statement()),
        }
    }

    /// After `if` or `elseif`
    /// `if` arm plus any number of `elseif` / `else if` arms, read in a loop
    fn if_stmt(&mut self, start: Span) -> Result<IfStmt, DialectAError> {
        let mut branches = Vec::new();
        let mut arm_start = start;
        let mut alternate = None;
        let mut end;

        loop {
            let condition = self.expression(Stop::AtBrace);
            let (body, body_loc) = self.block("if body")?;
            end = body_loc;
            branches.push(IfBranch {
                condition,
                body,
                loc: arm_start.merge(body_loc),
            });

            let resume = self.position;
            self.skip_separators();

            match self.peek() {
                Some(token) if token.kind.is_ident("elseif") => {
                    self.position += 1;
                    arm_start = token.span;
                }
                Some(token) if token.kind.is_ident("else") => {
                    self.position += 1;
                    self.skip_separators();
                    match self.peek() {
                        Some(next) if next.kind.is_ident("if") => {
                            self.position += 1;
                            arm_start = token.span;
                        }
                        _ => {
                            let (body, loc) = self.block("else body")?;
                            end = loc;
                            alternate = Some(body);
                            break;
                        }
                    }
                }
                _ => {
                    self.position = resume;
                    break;
                }
            }
        }

        Ok(IfStmt {
            branches,
            alternate,
            loc: start.merge(end),
        })
    }

    /// Collect an opaque expression; braces always end it
    fn expression(&mut self, stop: Stop) -> Expr {
        let start = self.position;
        let mut depth = 0usize;

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::LBrace | TokenKind::RBrace => break,
                TokenKind::Separator if depth == 0 && stop == Stop::AtStatementEnd => break,
                _ => {}
            }
            self.position += 1;
        }

        make_expr(&self.tokens[start..self.position])
    }

    /// Literal, separator, assignment, call or plain expression
    fn simple_statement(&mut self) -> Statement {
        let start = self.position;
        let Some(first) = self.peek() else {
            return Statement::Expression(Expr::default());
        };
        let next = self.kind_at(start + 1);

        match &first.kind {
            TokenKind::Op(op) if op == "--" && is_statement_end(next) => {
                self.position += 1;
                return Statement::OutputSeparator { loc: first.span };
            }
            // adjacent literals on one line are separate statements
            TokenKind::Str(value)
                if is_statement_end(next) || matches!(next, Some(TokenKind::Str(_))) =>
            {
                self.position += 1;
                return Statement::StringLiteral(StringLiteral {
                    value: value.clone(),
                    loc: first.span,
                });
            }
            TokenKind::Ident(callee) => {
                if let Some(statement) = self.assignment(start) {
                    return statement;
                }
                if let Some(statement) = self.call(start, callee) {
                    return statement;
                }
            }
            _ => {}
        }

        let expr = self.expression(Stop::AtStatementEnd);
        if self.position == start {
            self.position += 1;
        }
        Statement::Expression(expr)
    }

    /// `target[index]? op value` with `target` at `start`
    fn assignment(&mut self, start: usize) -> Option<Statement> {
        let mut index = start + 1;
        if self.kind_at(index) == Some(&TokenKind::LBracket) {
            index = self.matching(index)? + 1;
        }

        let operator = match self.kind_at(index) {
            Some(TokenKind::Op(op)) if ASSIGNMENT_OPERATORS.contains(&op.as_str()) => op.clone(),
            _ => return None,
        };

        let target = self.tokens[start..index]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<String>();
        let target_span = self.tokens[start].span;
        let operator_span = self.tokens[index].span;

        self.position = index + 1;
        let value = self.expression(Stop::AtStatementEnd);
        let end = if value.text.is_empty() {
            operator_span
        } else {
            value.loc
        };

        Some(Statement::Assignment(Assignment {
            target,
            operator,
            value,
            loc: target_span.merge(end),
        }))
    }

    /// `callee(args)` filling the whole statement
    fn call(&mut self, start: usize, callee: &str) -> Option<Statement> {
        if self.kind_at(start + 1) != Some(&TokenKind::LParen) {
            return None;
        }
        let close = self.matching(start + 1)?;
        if !is_statement_end(self.kind_at(close + 1)) {
            return None;
        }

        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut arg_start = start + 2;
        for index in start + 2..close {
            match self.tokens[index].kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    args.push(make_expr(&self.tokens[arg_start..index]));
                    arg_start = index + 1;
                }
                _ => {}
            }
        }
        args.push(make_expr(&self.tokens[arg_start..close]));
        args.retain(|arg| !arg.text.is_empty());

        self.position = close + 1;
        Some(Statement::CallExpr(CallExpr {
            callee: callee.to_string(),
            args,
            loc: self.tokens[start].span.merge(self.tokens[close].span),
        }))
    }
}

pub fn parse(tokens: &[LexToken]) -> Result<Program, DialectAError> {
    Parser::new(tokens).parse_program()
}
