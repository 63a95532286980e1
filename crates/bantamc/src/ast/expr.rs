//! Expression AST nodes

use crate::common::Span;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Type of this expression (filled in during type checking)
    pub ty: Option<String>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Resolved type, if the type checker has visited this node
    pub fn resolved_type(&self) -> Option<&str> {
        self.ty.as_deref()
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer constant: 42
    IntConst(i32),

    /// Boolean constant: true, false
    BoolConst(bool),

    /// String constant, contents between the quotes with escapes kept as written
    StrConst(String),

    /// Variable reference: x, this.x, super.x, a[i], this, null
    Var(VarRef),

    /// Assignment: x = e, this.x = e, a[i] = e
    Assign {
        target: VarRef,
        value: Box<Expr>,
    },

    /// Method dispatch: m(a), obj.m(a), super.m()
    Dispatch {
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },

    /// Object creation: new C()
    New { class: String },

    /// Array creation: new int[n]
    NewArray { element: String, size: Box<Expr> },

    /// Type test: e instanceof C
    InstanceOf { expr: Box<Expr>, ty: String },

    /// Checked cast: cast(C, e)
    Cast { ty: String, expr: Box<Expr> },

    /// Binary operation: a + b, x < y
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: -x, !flag, ++i, i--
    Unary { op: UnaryOp, operand: Box<Expr> },
}

/// A (possibly qualified, possibly indexed) variable reference
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    /// Qualifier before the dot, e.g. `this` in `this.x`
    pub reference: Option<Box<Expr>>,
    pub name: String,
    pub index: Option<Box<Expr>>,
}

impl VarRef {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            reference: None,
            name: name.into(),
            index: None,
        }
    }

    /// Name of the qualifier when it is a bare `this` or `super`
    pub fn qualifier(&self) -> Option<&str> {
        match self.reference.as_deref() {
            Some(Expr {
                kind: ExprKind::Var(VarRef {
                    reference: None,
                    name,
                    index: None,
                }),
                ..
            }) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Logical
    And,
    Or,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,     // -x
    Not,     // !x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_increment(&self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}
