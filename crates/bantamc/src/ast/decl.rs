//! Class and member declarations

use super::{Expr, Stmt};
use crate::common::Span;

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    /// Name in the `extends` clause, if any
    pub parent: Option<String>,
    pub members: Vec<Member>,
    /// Source file the class was declared in
    pub file: String,
    pub span: Span,
}

impl Class {
    pub fn new(name: impl Into<String>, file: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            parent: None,
            members: Vec::new(),
            file: file.into(),
            span,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            Member::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            Member::Field(_) => None,
        })
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods().find(|m| m.name == name)
    }
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(Field),
    Method(Method),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(f) => &f.name,
            Member::Method(m) => &m.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Member::Field(f) => f.span,
            Member::Method(m) => m.span,
        }
    }
}

/// Field declaration: Type name [= init];
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: String,
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

impl Field {
    pub fn new(ty: impl Into<String>, name: impl Into<String>, span: Span) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            init: None,
            span,
        }
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

/// Method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub return_type: String,
    pub name: String,
    pub formals: Vec<Formal>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Method {
    pub fn new(
        return_type: impl Into<String>,
        name: impl Into<String>,
        formals: Vec<Formal>,
        span: Span,
    ) -> Self {
        Self {
            return_type: return_type.into(),
            name: name.into(),
            formals,
            body: Vec::new(),
            span,
        }
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }
}

/// Method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Formal {
    pub ty: String,
    pub name: String,
    pub span: Span,
}

impl Formal {
    pub fn new(ty: impl Into<String>, name: impl Into<String>, span: Span) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            span,
        }
    }
}
