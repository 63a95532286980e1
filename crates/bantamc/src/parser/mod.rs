//! Parser producing the class-declaration AST

#[allow(clippy::module_inception)]
mod parser;

pub use parser::{parse, Parser};
