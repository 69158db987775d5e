//! Syntax tree for brace-structured scripts
//!
//! Expressions are kept as opaque token runs; only the string literals
//! inside them are located individually.

use crate::utils::Span;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub body: Vec<Statement>,
}

impl Program {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.body.iter().filter_map(|statement| match statement {
            Statement::FunctionDecl(function) => Some(function),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    pub value: String,
    pub loc: Span,
}

/// Opaque expression: source text plus the literals it contains
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expr {
    pub text: String,
    pub literals: Vec<StringLiteral>,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    /// Words after `:` in the header
    pub options: Vec<String>,
    pub body: Vec<Statement>,
    /// From the name to the closing brace
    pub loc: Span,
}

/// One `if` or `elseif` arm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Vec<Statement>,
    pub loc: Span,
}

/// `if` with its `elseif` / `else if` arms kept flat, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfStmt {
    pub branches: Vec<IfBranch>,
    /// Final `else` body
    pub alternate: Option<Vec<Statement>>,
    pub loc: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopKind {
    While,
    For,
    Foreach,
}

impl LoopKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "while" => Some(LoopKind::While),
            "for" => Some(LoopKind::For),
            "foreach" => Some(LoopKind::Foreach),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopStmt {
    pub kind: LoopKind,
    pub header: Expr,
    pub body: Vec<Statement>,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchStmt {
    pub subject: Expr,
    pub body: Vec<Statement>,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub target: String,
    pub operator: String,
    pub value: Expr,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallExpr {
    pub callee: String,
    pub args: Vec<Expr>,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JumpStmt {
    /// `return`, `break` or `continue`
    pub keyword: String,
    pub value: Option<Expr>,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    FunctionDecl(FunctionDecl),
    IfStmt(IfStmt),
    Loop(LoopStmt),
    Switch(SwitchStmt),
    Block { body: Vec<Statement>, loc: Span },
    Assignment(Assignment),
    CallExpr(CallExpr),
    StringLiteral(StringLiteral),
    Jump(JumpStmt),
    /// `--` on its own
    OutputSeparator { loc: Span },
    Expression(Expr),
}

impl Statement {
    pub fn loc(&self) -> Span {
        match self {
            Statement::FunctionDecl(s) => s.loc,
            Statement::IfStmt(s) => s.loc,
            Statement::Loop(s) => s.loc,
            Statement::Switch(s) => s.loc,
            Statement::Block { loc, .. } => *loc,
            Statement::Assignment(s) => s.loc,
            Statement::CallExpr(s) => s.loc,
            Statement::StringLiteral(s) => s.loc,
            Statement::Jump(s) => s.loc,
            Statement::OutputSeparator { loc } => *loc,
            Statement::Expression(e) => e.loc,
        }
    }
}
