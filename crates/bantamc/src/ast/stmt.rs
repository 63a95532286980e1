//! Statement AST nodes

use super::Expr;
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement: expr;
    Expr(Expr),

    /// Local declaration: Type name = init;
    Decl { ty: String, name: String, init: Expr },

    /// Block: { ... }
    Block(Vec<Stmt>),

    /// If statement: if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) body
    While { condition: Expr, body: Box<Stmt> },

    /// For loop: for (init; cond; update) body
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },

    /// Break statement
    Break,

    /// Return statement: return [expr];
    Return(Option<Expr>),
}
