//! Abstract Syntax Tree definitions

mod decl;
mod expr;
mod stmt;

pub use decl::*;
pub use expr::*;
pub use stmt::*;

/// A complete compilation unit (one source file)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub classes: Vec<Class>,
}

impl Program {
    pub fn new(classes: Vec<Class>) -> Self {
        Self { classes }
    }

    pub fn find_class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }
}
