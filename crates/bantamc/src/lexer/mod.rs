//! Lexer module for tokenizing Bantam source code

mod token;
mod scanner;

pub use token::{is_keyword, Token, TokenCategory, TokenKind, KEYWORDS, MAX_STRING_LENGTH};
pub use scanner::Lexer;
