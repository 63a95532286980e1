//! Lexer implementation using logos

use std::collections::VecDeque;

use super::token::{Token, TokenKind};
use crate::common::{Diagnostics, LexError, Span};
use codespan_reporting::files::line_starts;
use logos::Logos;

/// Lexer over one source file.
///
/// Produces a finite, forward-only token sequence ending in [`TokenKind::Eof`].
/// Malformed input yields [`TokenKind::Error`] tokens, which are also
/// registered with the diagnostics accumulator.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    file: &'a str,
    line_starts: Vec<usize>,
    diagnostics: &'a mut Diagnostics,
    /// Buffer for peeked tokens
    peeked: VecDeque<Token>,
    at_eof: bool,
    /// Set once the iterator has handed out the Eof token
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str, file: &'a str, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            file,
            line_starts: line_starts(source).collect(),
            diagnostics,
            peeked: VecDeque::new(),
            at_eof: false,
            exhausted: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        match self.peeked.pop_front() {
            Some(token) => token,
            None => self.scan_token(),
        }
    }

    /// Peek at the token at offset (0 = next, 1 = after next, etc.)
    pub fn peek_at(&mut self, offset: usize) -> &Token {
        while self.peeked.len() <= offset {
            let token = self.scan_token();
            self.peeked.push_back(token);
        }
        &self.peeked[offset]
    }

    /// Tokenize the entire source, up to and including Eof
    pub fn tokenize_all(self) -> Vec<Token> {
        self.collect()
    }

    pub fn file(&self) -> &'a str {
        self.file
    }

    /// Accumulator the lexer reports into, shared with the parser
    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    fn scan_token(&mut self) -> Token {
        if self.at_eof {
            return self.eof_token();
        }

        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.span();
                let token = Token::new(kind, self.inner.slice(), span);
                log::trace!("{}:{}: {} {:?}", self.file, token.line, kind, token.spelling);
                token
            }
            Some(Err(error)) => {
                let span = self.span();
                let message = match error {
                    LexError::UnsupportedCharacter => {
                        format!("unsupported character '{}'", self.inner.slice())
                    }
                    other => other.to_string(),
                };
                self.diagnostics.lexical(self.file, span, message.as_str());
                Token::new(TokenKind::Error, message, span)
            }
            None => {
                self.at_eof = true;
                self.eof_token()
            }
        }
    }

    fn eof_token(&self) -> Token {
        let len = self.inner.source().len();
        Token::new(TokenKind::Eof, "", Span::new(len, len, self.line_of(len)))
    }

    fn span(&self) -> Span {
        let range = self.inner.span();
        Span::new(range.start, range.end, self.line_of(range.start))
    }

    /// 1-based line containing the byte offset
    fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.exhausted = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DiagnosticKind;
    use crate::lexer::{TokenCategory, MAX_STRING_LENGTH};
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> (Vec<Token>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new(source, "Test.btm", &mut diagnostics).tokenize_all();
        (tokens, diagnostics)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_hello_world_golden() {
        let source = r#"/* Hello World
 * in one class */
class Main {
    // entry point
    void main() {
        TextIO io = new TextIO();
        io.putString("Hello, World!\n");
    }
}
"#;
        let (tokens, diagnostics) = lex(source);
        let actual: Vec<(TokenKind, &str, usize)> = tokens
            .iter()
            .map(|t| (t.kind, t.spelling.as_str(), t.line))
            .collect();

        use TokenKind::*;
        let expected = vec![
            (Comment, "/* Hello World\n * in one class */", 1),
            (Identifier, "class", 3),
            (Identifier, "Main", 3),
            (LBrace, "{", 3),
            (Comment, "// entry point", 4),
            (Identifier, "void", 5),
            (Identifier, "main", 5),
            (LParen, "(", 5),
            (RParen, ")", 5),
            (LBrace, "{", 5),
            (Identifier, "TextIO", 6),
            (Identifier, "io", 6),
            (Assign, "=", 6),
            (Identifier, "new", 6),
            (Identifier, "TextIO", 6),
            (LParen, "(", 6),
            (RParen, ")", 6),
            (Semi, ";", 6),
            (Identifier, "io", 7),
            (Dot, ".", 7),
            (Identifier, "putString", 7),
            (LParen, "(", 7),
            (StrConst, "\"Hello, World!\\n\"", 7),
            (RParen, ")", 7),
            (Semi, ";", 7),
            (RBrace, "}", 8),
            (RBrace, "}", 9),
            (Eof, "", 10),
        ];
        assert_eq!(actual, expected);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_operators_with_lookahead() {
        use TokenKind::*;
        assert_eq!(
            kinds("+ ++ - -- = == ! != && || < <= > >= * / %"),
            vec![
                Plus, PlusPlus, Minus, MinusMinus, Assign, EqEq, Bang, NotEq, AndAnd, OrOr, Lt,
                LtEq, Gt, GtEq, Star, Slash, Percent, Eof
            ]
        );
        assert_eq!(kinds("a+++b"), vec![Identifier, PlusPlus, Plus, Identifier, Eof]);
        assert_eq!(kinds("x/y//z"), vec![Identifier, Slash, Identifier, Comment, Eof]);
    }

    #[test]
    fn test_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds(". ; : , ( ) { } [ ]"),
            vec![Dot, Semi, Colon, Comma, LParen, RParen, LBrace, RBrace, LBracket, RBracket, Eof]
        );
    }

    #[test]
    fn test_identifiers_and_literals() {
        let (tokens, _) = lex("foo bar_9 true falsely 42 \"s\"");
        let pairs: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.spelling.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (TokenKind::Identifier, "foo"),
                (TokenKind::Identifier, "bar_9"),
                (TokenKind::BoolConst, "true"),
                (TokenKind::Identifier, "falsely"),
                (TokenKind::IntConst, "42"),
                (TokenKind::StrConst, "\"s\""),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_keywords_are_identifiers_with_keyword_category() {
        let (tokens, _) = lex("while whiles");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].category(), TokenCategory::Keyword);
        assert_eq!(tokens[1].category(), TokenCategory::Identifier);
    }

    #[test]
    fn test_integer_too_large() {
        let (tokens, diagnostics) = lex("2147483647 2147483648");
        assert_eq!(tokens[0].kind, TokenKind::IntConst);
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].spelling, "integer constant too large");
        assert_eq!(diagnostics.count_of(DiagnosticKind::Lexical), 1);
    }

    #[test]
    fn test_string_errors_are_distinct() {
        let cases = [
            ("\"abc", "unterminated string"),
            ("\"ab\\\ncd\"", "multi-line string"),
            ("\"a\\qb\"", "illegal escape sequence \\q in string"),
        ];
        for (source, message) in cases {
            let (tokens, diagnostics) = lex(source);
            assert_eq!(tokens[0].kind, TokenKind::Error, "{source:?}");
            assert_eq!(tokens[0].spelling, message);
            assert_eq!(diagnostics.messages(), vec![message]);
        }
    }

    #[test]
    fn test_allowed_escapes() {
        let (tokens, diagnostics) = lex(r#""\n\t\"\\\f""#);
        assert_eq!(tokens[0].kind, TokenKind::StrConst);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_string_length_limit() {
        let ok = format!("\"{}\"", "a".repeat(MAX_STRING_LENGTH));
        let long = format!("\"{}\"", "a".repeat(MAX_STRING_LENGTH + 1));
        assert_eq!(kinds(&ok), vec![TokenKind::StrConst, TokenKind::Eof]);

        let (tokens, _) = lex(&long);
        assert_eq!(tokens[0].spelling, "string constant too long");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string_recovers_on_next_line() {
        let (tokens, _) = lex("\"oops\nx");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string_does_not_swallow_later_lines() {
        let (tokens, diagnostics) = lex("s = \"oops;\nint x = 5;\nt = \"ok\";");
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(
            tokens[3..8].iter().map(|t| t.spelling.as_str()).collect::<Vec<_>>(),
            vec!["int", "x", "=", "5", ";"]
        );
        assert_eq!(tokens[3].line, 2);
        assert_eq!(tokens[10].kind, TokenKind::StrConst);
        assert_eq!(diagnostics.messages(), vec!["unterminated string"]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, diagnostics) = lex("x /* never closed");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].spelling, "unterminated block comment");
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(diagnostics.count(), 1);
    }

    #[test]
    fn test_unsupported_character() {
        let (tokens, diagnostics) = lex("a # b & c");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].spelling, "unsupported character '#'");
        assert_eq!(tokens[3].spelling, "unsupported character '&'");
        assert_eq!(diagnostics.count(), 2);
        assert_eq!(diagnostics.records()[0].line, 1);
    }

    #[test]
    fn test_eof_repeats_but_iterator_ends() {
        let mut diagnostics = Diagnostics::new();
        let mut lexer = Lexer::new("x", "Test.btm", &mut diagnostics);
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);

        let mut diagnostics = Diagnostics::new();
        let lexer = Lexer::new("x", "Test.btm", &mut diagnostics);
        assert_eq!(lexer.count(), 2);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut diagnostics = Diagnostics::new();
        let mut lexer = Lexer::new("a b", "Test.btm", &mut diagnostics);
        assert_eq!(lexer.peek_at(1).spelling, "b");
        assert_eq!(lexer.next_token().spelling, "a");
        assert_eq!(lexer.next_token().spelling, "b");
    }
}
