//! Bantam Compiler - front end for the Bantam object language
//!
//! Bantam is a small single-inheritance, class-based language. This library
//! turns Bantam source into a type-annotated AST plus a class hierarchy, and
//! reports every lexical, syntax and semantic problem it finds on the way.
//!
//! ## Architecture
//!
//! The front end is organized into:
//! - **Lexer** (`lexer/`): source text to tokens
//! - **Parser** (`parser/`): recursive descent, tokens to AST
//! - **AST** (`ast/`): class, member, statement and expression nodes
//! - **Semantic analysis** (`sema/`): class hierarchy, symbol tables, type checking
//! - **Driver** (`driver/`): one-shot scan / parse / check sessions
//! - **Common** (`common/`): shared infrastructure (errors, spans, diagnostics)

pub mod ast;
pub mod common;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod sema;

// Re-exports for convenience
pub use common::{
    CompileError, CompileResult, Diagnostic, DiagnosticKind, DiagnosticReporter, Diagnostics,
    Span,
};
pub use driver::{Analysis, Session, SessionConfig};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, Parser};
pub use sema::{ClassHierarchy, SemanticAnalyzer};
