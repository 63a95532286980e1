//! Error types

use thiserror::Error;
use super::Span;

/// Failure of a front-end stage.
///
/// Lexical and semantic problems are accumulated in [`super::Diagnostics`];
/// only the conditions that stop a run surface as a `CompileError`.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    #[error("{count} error(s) found during analysis")]
    Analysis { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn analysis(count: usize) -> Self {
        Self::Analysis { count }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Malformed token, produced by the lexer as an error token
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexError {
    #[default]
    #[error("unsupported character")]
    UnsupportedCharacter,

    #[error("integer constant too large")]
    IntegerTooLarge,

    #[error("unterminated string")]
    UnterminatedString,

    #[error("multi-line string")]
    MultiLineString,

    #[error("illegal escape sequence \\{0} in string")]
    IllegalEscape(char),

    #[error("string constant too long")]
    StringTooLong,

    #[error("unterminated block comment")]
    UnterminatedComment,
}
