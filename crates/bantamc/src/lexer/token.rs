//! Token definitions

use crate::common::{LexError, Span};
use logos::Logos;

/// Longest string constant accepted, in characters between the quotes
pub const MAX_STRING_LENGTH: usize = 5000;

/// Characters allowed after a backslash inside a string constant
const STRING_ESCAPES: [char; 5] = ['n', 't', '"', '\\', 'f'];

/// Words the parser treats as keywords. The lexer reports them as identifiers.
pub const KEYWORDS: &[&str] = &[
    "class",
    "extends",
    "if",
    "else",
    "while",
    "for",
    "return",
    "break",
    "new",
    "cast",
    "instanceof",
];

pub fn is_keyword(spelling: &str) -> bool {
    KEYWORDS.contains(&spelling)
}

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, or the error message for [`TokenKind::Error`]
    pub spelling: String,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, spelling: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            line: span.line,
            span,
        }
    }

    /// True for an identifier spelled exactly `word`
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.spelling == word
    }

    pub fn category(&self) -> TokenCategory {
        match self.kind {
            TokenKind::Identifier if is_keyword(&self.spelling) => TokenCategory::Keyword,
            kind => kind.category(),
        }
    }
}

/// Coarse grouping of token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Identifier,
    Literal,
    Keyword,
    Operator,
    Punctuation,
    Comment,
    Error,
    EndOfInput,
}

/// All token kinds
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // === Literals and names ===
    #[token("true")]
    #[token("false")]
    BoolConst,

    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+", int_constant)]
    IntConst,

    #[token("\"", string_constant)]
    StrConst,

    #[regex(r"//[^\n]*")]
    #[token("/*", block_comment)]
    Comment,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Assign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // === Punctuation ===
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Special
    Error,
    Eof,
}

fn int_constant(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    lex.slice()
        .parse::<i32>()
        .map(|_| ())
        .map_err(|_| LexError::IntegerTooLarge)
}

/// Scan the body of a string constant after its opening quote.
fn string_constant(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    let rest = lex.remainder();
    let mut chars = rest.char_indices();
    let mut length = 0;
    let mut newline = false;
    let mut illegal_escape = None;

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return if newline {
                    Err(LexError::MultiLineString)
                } else if let Some(escape) = illegal_escape {
                    Err(LexError::IllegalEscape(escape))
                } else if length > MAX_STRING_LENGTH {
                    Err(LexError::StringTooLong)
                } else {
                    Ok(())
                };
            }
            '\\' => match chars.next() {
                Some((_, escape)) if STRING_ESCAPES.contains(&escape) => length += 1,
                Some((_, '\n')) => {
                    newline = true;
                    length += 1;
                }
                Some((_, escape)) => {
                    illegal_escape.get_or_insert(escape);
                    length += 1;
                }
                None => break,
            },
            // A raw line break ends the string; only `\` continues it
            '\n' => {
                lex.bump(i);
                return Err(LexError::UnterminatedString);
            }
            _ => length += 1,
        }
    }

    lex.bump(rest.len());
    Err(LexError::UnterminatedString)
}

fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            let len = lex.remainder().len();
            lex.bump(len);
            Err(LexError::UnterminatedComment)
        }
    }
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Identifier => TokenCategory::Identifier,
            TokenKind::BoolConst | TokenKind::IntConst | TokenKind::StrConst => {
                TokenCategory::Literal
            }
            TokenKind::Comment => TokenCategory::Comment,
            TokenKind::Dot
            | TokenKind::Semi
            | TokenKind::Colon
            | TokenKind::Comma
            | TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::LBracket
            | TokenKind::RBracket => TokenCategory::Punctuation,
            TokenKind::Error => TokenCategory::Error,
            TokenKind::Eof => TokenCategory::EndOfInput,
            _ => TokenCategory::Operator,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::BoolConst => write!(f, "boolean constant"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::IntConst => write!(f, "integer constant"),
            TokenKind::StrConst => write!(f, "string constant"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::PlusPlus => write!(f, "'++'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::MinusMinus => write!(f, "'--'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Semi => write!(f, "';'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Error => write!(f, "invalid token"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}
