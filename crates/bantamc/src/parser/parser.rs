//! Recursive descent parser

use crate::ast::*;
use crate::common::{CompileError, CompileResult, Diagnostics, Span};
use crate::lexer::{is_keyword, Lexer, Token, TokenKind};

/// Parse one source file into a [`Program`].
///
/// Stops at the first syntax error, which is registered with `diagnostics`
/// before the error is returned.
pub fn parse(source: &str, file: &str, diagnostics: &mut Diagnostics) -> CompileResult<Program> {
    Parser::new(source, file, diagnostics).parse()
}

/// Recursive descent parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Span of the last primary that was a bare parenthesized expression
    grouped: Option<Span>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str, file: &'a str, diagnostics: &'a mut Diagnostics) -> Self {
        let mut lexer = Lexer::new(source, file, diagnostics);
        let current = Self::next_significant(&mut lexer);
        Self {
            lexer,
            current,
            grouped: None,
        }
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut classes = Vec::new();

        while !self.at_end() {
            classes.push(self.parse_class()?);
        }

        log::debug!("parsed {} class(es) from {}", classes.len(), self.lexer.file());
        Ok(Program::new(classes))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn next_significant(lexer: &mut Lexer<'_>) -> Token {
        loop {
            let token = lexer.next_token();
            if token.kind != TokenKind::Comment {
                return token;
            }
        }
    }

    fn at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let next = Self::next_significant(&mut self.lexer);
        std::mem::replace(&mut self.current, next)
    }

    /// Kind of the n-th significant token after the current one
    fn lookahead(&mut self, n: usize) -> TokenKind {
        let mut seen = 0;
        let mut offset = 0;
        loop {
            let kind = self.lexer.peek_at(offset).kind;
            if kind == TokenKind::Eof {
                return kind;
            }
            if kind != TokenKind::Comment {
                if seen == n {
                    return kind;
                }
                seen += 1;
            }
            offset += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn check_word(&self, word: &str) -> bool {
        self.current.is_word(word)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_word(&mut self, word: &str) -> CompileResult<Token> {
        if self.check_word(word) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{word}'")))
        }
    }

    /// Expect an identifier that is not a keyword
    fn expect_identifier(&mut self) -> CompileResult<Token> {
        if self.check(TokenKind::Identifier) && !is_keyword(&self.current.spelling) {
            Ok(self.advance())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn unexpected(&mut self, expected: &str) -> CompileError {
        let message = format!("expected {}, found {}", expected, describe(&self.current));
        let span = self.current.span;
        self.error(message, span)
    }

    /// Register a syntax error and build the error that aborts the parse
    fn error(&mut self, message: impl Into<String>, span: Span) -> CompileError {
        let message = message.into();
        let file = self.lexer.file();
        self.lexer.diagnostics().syntax(file, span, message.as_str());
        CompileError::syntax(message, span)
    }

    // =========================================================================
    // Classes and members
    // =========================================================================

    fn parse_class(&mut self) -> CompileResult<Class> {
        let start_span = self.expect_word("class")?.span;
        let name = self.expect_identifier()?.spelling;

        let parent = if self.match_word("extends") {
            Some(self.expect_identifier()?.spelling)
        } else {
            None
        };

        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            members.push(self.parse_member()?);
        }
        let end = self.expect(TokenKind::RBrace)?;

        let mut class = Class::new(name, self.lexer.file(), start_span.merge(end.span))
            .with_members(members);
        if let Some(parent) = parent {
            class = class.with_parent(parent);
        }
        Ok(class)
    }

    fn parse_member(&mut self) -> CompileResult<Member> {
        let start_span = self.current.span;
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?.spelling;

        if self.match_token(TokenKind::LParen) {
            let formals = self.parse_formals()?;
            self.expect(TokenKind::RParen)?;
            let (body, body_span) = self.parse_block()?;
            let span = start_span.merge(body_span);
            return Ok(Member::Method(Method::new(ty, name, formals, span).with_body(body)));
        }

        let init = if self.match_token(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semi)?;

        let mut field = Field::new(ty, name, start_span.merge(end.span));
        if let Some(init) = init {
            field = field.with_init(init);
        }
        Ok(Member::Field(field))
    }

    fn parse_formals(&mut self) -> CompileResult<Vec<Formal>> {
        let mut formals = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(formals);
        }

        loop {
            let start_span = self.current.span;
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            formals.push(Formal::new(ty, name.spelling, start_span.merge(name.span)));

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(formals)
    }

    /// Type name, optionally followed by `[]`
    fn parse_type(&mut self) -> CompileResult<String> {
        let mut ty = self.expect_identifier()?.spelling;
        if self.match_token(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket)?;
            ty.push_str("[]");
        }
        Ok(ty)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current.span;

        let kind = self.current.kind;
        match kind {
            TokenKind::LBrace => {
                let (stmts, span) = self.parse_block()?;
                Ok(Stmt::new(StmtKind::Block(stmts), span))
            }
            TokenKind::Identifier if self.at_declaration() => self.parse_declaration(),
            TokenKind::Identifier => match self.current.spelling.as_str() {
                "if" => self.parse_if_statement(),
                "while" => self.parse_while_statement(),
                "for" => self.parse_for_statement(),
                "return" => self.parse_return_statement(),
                "break" => {
                    self.advance();
                    let end = self.expect(TokenKind::Semi)?;
                    Ok(Stmt::new(StmtKind::Break, start_span.merge(end.span)))
                }
                _ => self.parse_expression_statement(),
            },
            _ => self.parse_expression_statement(),
        }
    }

    /// `T name` or `T[] name` starts a local declaration
    fn at_declaration(&mut self) -> bool {
        if is_keyword(&self.current.spelling) {
            return false;
        }
        match self.lookahead(0) {
            TokenKind::Identifier => true,
            TokenKind::LBracket => self.lookahead(1) == TokenKind::RBracket,
            _ => false,
        }
    }

    fn parse_block(&mut self) -> CompileResult<(Vec<Stmt>, Span)> {
        let start_span = self.expect(TokenKind::LBrace)?.span;

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            stmts.push(self.parse_statement()?);
        }

        let end = self.expect(TokenKind::RBrace)?;
        Ok((stmts, start_span.merge(end.span)))
    }

    fn parse_declaration(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current.span;
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?.spelling;
        self.expect(TokenKind::Assign)?;
        let init = self.parse_expression()?;
        let end = self.expect(TokenKind::Semi)?;

        Ok(Stmt::new(
            StmtKind::Decl { ty, name, init },
            start_span.merge(end.span),
        ))
    }

    fn parse_if_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.expect_word("if")?.span;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;

        let then_branch = Box::new(self.parse_statement()?);
        let mut span = start_span.merge(then_branch.span);

        let else_branch = if self.match_word("else") {
            let branch = self.parse_statement()?;
            span = span.merge(branch.span);
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.expect_word("while")?.span;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        let span = start_span.merge(body.span);

        Ok(Stmt::new(StmtKind::While { condition, body }, span))
    }

    fn parse_for_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.expect_word("for")?.span;
        self.expect(TokenKind::LParen)?;

        let init = self.parse_optional_expression(TokenKind::Semi)?;
        self.expect(TokenKind::Semi)?;
        let condition = self.parse_optional_expression(TokenKind::Semi)?;
        self.expect(TokenKind::Semi)?;
        let update = self.parse_optional_expression(TokenKind::RParen)?;
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        let span = start_span.merge(body.span);

        Ok(Stmt::new(
            StmtKind::For {
                init,
                condition,
                update,
                body,
            },
            span,
        ))
    }

    fn parse_optional_expression(&mut self, terminator: TokenKind) -> CompileResult<Option<Expr>> {
        if self.check(terminator) {
            Ok(None)
        } else {
            Ok(Some(self.parse_expression()?))
        }
    }

    fn parse_return_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.expect_word("return")?.span;
        let value = self.parse_optional_expression(TokenKind::Semi)?;
        let end = self.expect(TokenKind::Semi)?;

        Ok(Stmt::new(StmtKind::Return(value), start_span.merge(end.span)))
    }

    fn parse_expression_statement(&mut self) -> CompileResult<Stmt> {
        let expr = self.parse_expression()?;
        let end = self.expect(TokenKind::Semi)?;
        let span = expr.span.merge(end.span);

        Ok(Stmt::new(StmtKind::Expr(expr), span))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<Expr> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> CompileResult<Expr> {
        let left = self.parse_logical_or_expression()?;

        if !self.check(TokenKind::Assign) {
            return Ok(left);
        }

        let target = match left.kind {
            ExprKind::Var(target) if self.grouped != Some(left.span) => target,
            _ => return Err(self.error("invalid assignment target", left.span)),
        };
        self.advance();

        // Right-associative: a = b = c
        let value = self.parse_assignment_expression()?;
        let span = left.span.merge(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                target,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_logical_or_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_logical_and_expression()?;

        while self.match_token(TokenKind::OrOr) {
            let right = self.parse_logical_and_expression()?;
            left = Self::binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    fn parse_logical_and_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_equality_expression()?;

        while self.match_token(TokenKind::AndAnd) {
            let right = self.parse_equality_expression()?;
            left = Self::binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_relational_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_relational_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_additive_expression()?;

        loop {
            if self.check_word("instanceof") {
                self.advance();
                let ty_span = self.current.span;
                let ty = self.parse_type()?;
                let span = left.span.merge(ty_span);
                left = Expr::new(
                    ExprKind::InstanceOf {
                        expr: Box::new(left),
                        ty,
                    },
                    span,
                );
                continue;
            }

            let op = match self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> CompileResult<Expr> {
        let start_span = self.current.span;

        let op = match self.current.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::MinusMinus => UnaryOp::PreDec,
            _ if self.check_word("new") => return self.parse_new_expression(),
            _ if self.check_word("cast") => return self.parse_cast_expression(),
            _ => return self.parse_postfix_expression(),
        };
        self.advance();

        let operand = self.parse_unary_expression()?;
        let span = start_span.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_new_expression(&mut self) -> CompileResult<Expr> {
        let start_span = self.expect_word("new")?.span;
        let class = self.expect_identifier()?.spelling;

        if self.match_token(TokenKind::LParen) {
            let end = self.expect(TokenKind::RParen)?;
            return Ok(Expr::new(ExprKind::New { class }, start_span.merge(end.span)));
        }

        if self.match_token(TokenKind::LBracket) {
            let size = self.parse_expression()?;
            let end = self.expect(TokenKind::RBracket)?;
            return Ok(Expr::new(
                ExprKind::NewArray {
                    element: class,
                    size: Box::new(size),
                },
                start_span.merge(end.span),
            ));
        }

        Err(self.unexpected("'(' or '['"))
    }

    fn parse_cast_expression(&mut self) -> CompileResult<Expr> {
        let start_span = self.expect_word("cast")?.span;
        self.expect(TokenKind::LParen)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Comma)?;
        let expr = self.parse_expression()?;
        let end = self.expect(TokenKind::RParen)?;

        Ok(Expr::new(
            ExprKind::Cast {
                ty,
                expr: Box::new(expr),
            },
            start_span.merge(end.span),
        ))
    }

    fn parse_postfix_expression(&mut self) -> CompileResult<Expr> {
        let expr = self.parse_primary_expression()?;

        let op = match self.current.kind {
            TokenKind::PlusPlus => UnaryOp::PostInc,
            TokenKind::MinusMinus => UnaryOp::PostDec,
            _ => return Ok(expr),
        };
        let end = self.advance();
        let span = expr.span.merge(end.span);

        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(expr),
            },
            span,
        ))
    }

    fn parse_argument_list(&mut self) -> CompileResult<(Vec<Expr>, Span)> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end = self.expect(TokenKind::RParen)?;
        Ok((args, end.span))
    }

    /// `name(args)` or `name[index]` or `name`, with an optional receiver
    fn parse_name_suffix(&mut self, receiver: Option<Expr>) -> CompileResult<Expr> {
        let name = self.expect_identifier()?;
        let start_span = receiver.as_ref().map_or(name.span, |r| r.span);

        if self.check(TokenKind::LParen) {
            let (args, end_span) = self.parse_argument_list()?;
            return Ok(Expr::new(
                ExprKind::Dispatch {
                    receiver: receiver.map(Box::new),
                    method: name.spelling,
                    args,
                },
                start_span.merge(end_span),
            ));
        }

        let mut span = start_span.merge(name.span);
        let index = if self.match_token(TokenKind::LBracket) {
            let index = self.parse_expression()?;
            span = span.merge(self.expect(TokenKind::RBracket)?.span);
            Some(Box::new(index))
        } else {
            None
        };

        Ok(Expr::new(
            ExprKind::Var(VarRef {
                reference: receiver.map(Box::new),
                name: name.spelling,
                index,
            }),
            span,
        ))
    }

    fn parse_primary_expression(&mut self) -> CompileResult<Expr> {
        let token = self.current.clone();

        let mut expr = match token.kind {
            TokenKind::LParen => {
                self.advance();
                let mut inner = self.parse_expression()?;
                let end = self.expect(TokenKind::RParen)?;
                inner.span = token.span.merge(end.span);
                inner
            }
            TokenKind::IntConst => {
                self.advance();
                let value = token
                    .spelling
                    .parse::<i32>()
                    .map_err(|_| self.error("invalid integer constant", token.span))?;
                Expr::new(ExprKind::IntConst(value), token.span)
            }
            TokenKind::BoolConst => {
                self.advance();
                Expr::new(ExprKind::BoolConst(token.spelling == "true"), token.span)
            }
            TokenKind::StrConst => {
                self.advance();
                let contents = token.spelling[1..token.spelling.len() - 1].to_string();
                Expr::new(ExprKind::StrConst(contents), token.span)
            }
            TokenKind::Identifier if !is_keyword(&token.spelling) => {
                self.parse_name_suffix(None)?
            }
            _ => return Err(self.unexpected("expression")),
        };

        let mut suffixed = false;
        while self.match_token(TokenKind::Dot) {
            expr = self.parse_name_suffix(Some(expr))?;
            suffixed = true;
        }

        if token.kind == TokenKind::LParen && !suffixed {
            self.grouped = Some(expr.span);
        }
        Ok(expr)
    }
}

/// How a token is named in error messages
fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Identifier if is_keyword(&token.spelling) => {
            format!("keyword '{}'", token.spelling)
        }
        TokenKind::Identifier
        | TokenKind::IntConst
        | TokenKind::BoolConst
        | TokenKind::StrConst => format!("{} {}", token.kind, token.spelling),
        _ => token.kind.to_string(),
    }
}
