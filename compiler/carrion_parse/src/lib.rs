//! Parser for Carrion source.
//!
//! [`parse`] lexes and parses a whole document, returning the recovered
//! [`Program`] together with the error list; parse failures are data, not
//! unwinding. Recovery is per statement: a failed statement skips to the
//! next line (or the enclosing dedent) and parsing continues, so a single
//! typo does not hide the rest of the file from the symbol extractor.

mod error;
mod expr;

pub use error::ParseError;
pub use expr::operator_precedence;

use carrion_ir::ast::*;
use carrion_ir::{Span, Token, TokenKind};

/// Parse source text. Always returns a program; when errors are present
/// the program holds whatever statements were recovered.
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    parse_tokens(carrion_lexer::lex(source))
}

/// Parse an already-lexed token stream.
pub fn parse_tokens(tokens: Vec<Token>) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.errors)
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    prev_span: Span,
    errors: Vec<ParseError>,
}

/// Statement parsers return `Err(())` after recording an error; recovery
/// happens at the call site.
type ParseResult<T> = Result<T, ()>;

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        // Cursor logic relies on a terminal Eof; add one when the caller
        // hands over a stream without it.
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end), 0, 0));
        }
        Parser {
            tokens,
            pos: 0,
            prev_span: Span::default(),
            errors: Vec::new(),
        }
    }

    // === Cursor ===

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.prev_span
    }

    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        self.prev_span = tok.span;
        tok
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(ParseError::new(message, span));
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            let found = self.peek().describe();
            self.error(
                format!("expected {}, found {}", kind.describe(), found),
                self.current_span(),
            );
            Err(())
        }
    }

    fn expect_ident(&mut self) -> ParseResult<(String, Span)> {
        match self.peek() {
            TokenKind::Ident(_) => {
                let tok = self.bump();
                let TokenKind::Ident(name) = tok.kind else {
                    unreachable!()
                };
                Ok((name, tok.span))
            }
            other => {
                let msg = format!("expected identifier, found {}", other.describe());
                self.error(msg, self.current_span());
                Err(())
            }
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.bump();
        }
    }

    /// Consume the statement terminator: a newline, or a block/file end
    /// (left for the caller).
    fn end_statement(&mut self) -> ParseResult<()> {
        match self.peek() {
            TokenKind::Newline => {
                self.bump();
                Ok(())
            }
            TokenKind::Dedent | TokenKind::Eof => Ok(()),
            other => {
                let msg = format!("expected end of statement, found {}", other.describe());
                self.error(msg, self.current_span());
                Err(())
            }
        }
    }

    /// Skip to the start of the next statement after an error.
    fn synchronize(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Eof | TokenKind::Dedent => return,
                TokenKind::Newline => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span)
    }

    // === Program / blocks ===

    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            // Stray dedents can follow recovery; drop them.
            if matches!(self.peek(), TokenKind::Indent | TokenKind::Dedent) {
                self.bump();
                continue;
            }
            if matches!(self.peek(), TokenKind::Eof) {
                break;
            }
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
        }
        Program { statements }
    }

    /// A `:`-introduced suite: either an indented block or a single inline
    /// statement on the same line.
    fn parse_block(&mut self) -> ParseResult<Block> {
        let (block, _) = self.parse_block_inner(false)?;
        Ok(block)
    }

    /// Like [`Self::parse_block`], but a leading docstring line is pulled
    /// out of the body (function and grimoire suites).
    fn parse_doc_block(&mut self) -> ParseResult<(Block, Option<String>)> {
        self.parse_block_inner(true)
    }

    fn parse_block_inner(&mut self, want_doc: bool) -> ParseResult<(Block, Option<String>)> {
        self.expect(&TokenKind::Colon)?;
        let start = self.current_span();
        let mut doc = None;

        if !self.at(&TokenKind::Newline) {
            // Inline suite: one statement on the same line.
            let stmt = self.parse_statement()?;
            let span = stmt.span();
            return Ok((
                Block {
                    statements: vec![stmt],
                    span,
                },
                None,
            ));
        }

        self.skip_newlines();
        if !self.eat(&TokenKind::Indent) {
            self.error("expected an indented block", self.current_span());
            return Err(());
        }

        let mut statements = Vec::new();
        self.skip_newlines();
        if want_doc {
            if let TokenKind::DocString(_) = self.peek() {
                let tok = self.bump();
                if let TokenKind::DocString(body) = tok.kind {
                    doc = Some(body.trim().to_string());
                }
                self.skip_newlines();
            }
        }

        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::Dedent => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => break,
                _ => match self.parse_statement() {
                    Ok(stmt) => statements.push(stmt),
                    Err(()) => self.synchronize(),
                },
            }
        }

        let span = statements
            .iter()
            .map(Statement::span)
            .fold(start, |acc, s| acc.merge(s));
        Ok((Block { statements, span }, doc))
    }

    // === Statements ===

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek() {
            TokenKind::Spell => self.parse_function(false).map(Statement::Function),
            TokenKind::Arcanespell => self.parse_function(true).map(Statement::Function),
            TokenKind::Init => self.parse_init().map(Statement::Function),
            TokenKind::Grim => self.parse_class(false).map(Statement::Class),
            TokenKind::Arcane => {
                self.bump();
                if !self.at(&TokenKind::Grim) {
                    self.error("expected grim after arcane", self.current_span());
                    return Err(());
                }
                self.parse_class(true).map(Statement::Class)
            }
            TokenKind::If => self.parse_if().map(Statement::If),
            TokenKind::For => self.parse_for().map(Statement::For),
            TokenKind::While => self.parse_while().map(Statement::While),
            TokenKind::Return => self.parse_return().map(Statement::Return),
            TokenKind::Attempt => self.parse_attempt().map(Statement::Attempt),
            TokenKind::Autoclose => self.parse_autoclose().map(Statement::Autoclose),
            TokenKind::Import => self.parse_import().map(Statement::Import),
            TokenKind::Match => self.parse_match().map(Statement::Match),
            TokenKind::Main => self.parse_main().map(Statement::Main),
            TokenKind::Global => self.parse_global().map(Statement::Global),
            TokenKind::Raise => self.parse_raise().map(Statement::Raise),
            TokenKind::Check => self.parse_check().map(Statement::Check),
            TokenKind::Stop => {
                let span = self.bump().span;
                self.end_statement()?;
                Ok(Statement::Stop(span))
            }
            TokenKind::Skip => {
                let span = self.bump().span;
                self.end_statement()?;
                Ok(Statement::Skip(span))
            }
            TokenKind::Ignore => {
                let span = self.bump().span;
                self.end_statement()?;
                Ok(Statement::Ignore(span))
            }
            _ => self.parse_expression_or_assign(),
        }
    }

    fn parse_function(&mut self, is_arcane: bool) -> ParseResult<FunctionDef> {
        let start = self.bump().span; // spell / arcanespell
        let (name, name_span) = self.expect_ident()?;
        let params = self.parse_params()?;
        let (body, doc_string) = self.parse_doc_block()?;
        Ok(FunctionDef {
            name,
            name_span,
            params,
            body,
            doc_string,
            is_init: false,
            is_arcane,
            span: self.span_from(start),
        })
    }

    fn parse_init(&mut self) -> ParseResult<FunctionDef> {
        let start = self.bump().span; // init
        let name_span = start;
        let params = self.parse_params()?;
        let (body, doc_string) = self.parse_doc_block()?;
        Ok(FunctionDef {
            name: "init".to_string(),
            name_span,
            params,
            body,
            doc_string,
            is_init: true,
            is_arcane: false,
            span: self.span_from(start),
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let (name, name_span) = self.expect_ident()?;
            let mut param = Param {
                name,
                type_hint: None,
                default: None,
                span: name_span,
            };
            if self.eat(&TokenKind::Colon) {
                param.type_hint = Some(self.parse_expression()?);
            }
            if self.eat(&TokenKind::Assign) {
                param.default = Some(self.parse_expression()?);
            }
            param.span = self.span_from(name_span);
            params.push(param);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_class(&mut self, is_arcane: bool) -> ParseResult<ClassDef> {
        let start = self.bump().span; // grim
        let (name, name_span) = self.expect_ident()?;
        let mut inherits = None;
        if self.eat(&TokenKind::LParen) {
            let (parent, _) = self.expect_ident()?;
            inherits = Some(parent);
            self.expect(&TokenKind::RParen)?;
        }
        let (body, doc_string) = self.parse_doc_block()?;

        let mut init = None;
        let mut methods = Vec::new();
        for stmt in body.statements {
            match stmt {
                Statement::Function(f) if f.is_init => {
                    if init.is_some() {
                        self.error(format!("grimoire {name} has more than one init"), f.span);
                    }
                    init = Some(f);
                }
                Statement::Function(f) => methods.push(f),
                Statement::Ignore(_) => {}
                other => {
                    self.error(
                        "only spells and init are allowed in a grimoire body",
                        other.span(),
                    );
                }
            }
        }

        Ok(ClassDef {
            name,
            name_span,
            inherits,
            init,
            methods,
            doc_string,
            is_arcane,
            span: self.span_from(start),
        })
    }

    fn parse_if(&mut self) -> ParseResult<IfStatement> {
        let start = self.bump().span; // if
        let condition = self.parse_expression()?;
        let consequence = self.parse_block()?;

        let mut otherwise_branches = Vec::new();
        loop {
            let mark = self.pos;
            self.skip_newlines();
            if self.at(&TokenKind::Otherwise) {
                let branch_start = self.bump().span;
                let cond = self.parse_expression()?;
                let body = self.parse_block()?;
                otherwise_branches.push(OtherwiseBranch {
                    condition: cond,
                    consequence: body,
                    span: self.span_from(branch_start),
                });
            } else {
                self.pos = mark;
                break;
            }
        }

        let alternative = self.parse_trailing_else()?;
        Ok(IfStatement {
            condition,
            consequence,
            otherwise_branches,
            alternative,
            span: self.span_from(start),
        })
    }

    /// An optional `else:` block following a suite at the same depth.
    fn parse_trailing_else(&mut self) -> ParseResult<Option<Block>> {
        let mark = self.pos;
        self.skip_newlines();
        if self.at(&TokenKind::Else) {
            self.bump();
            Ok(Some(self.parse_block()?))
        } else {
            self.pos = mark;
            Ok(None)
        }
    }

    fn parse_for(&mut self) -> ParseResult<ForStatement> {
        let start = self.bump().span; // for
        let variable = self.parse_expression()?;
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let alternative = self.parse_trailing_else()?;
        Ok(ForStatement {
            variable,
            iterable,
            body,
            alternative,
            span: self.span_from(start),
        })
    }

    fn parse_while(&mut self) -> ParseResult<WhileStatement> {
        let start = self.bump().span; // while
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(WhileStatement {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_return(&mut self) -> ParseResult<ReturnStatement> {
        let start = self.bump().span; // return
        let value = if matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.end_statement()?;
        Ok(ReturnStatement {
            value,
            span: self.span_from(start),
        })
    }

    fn parse_attempt(&mut self) -> ParseResult<AttemptStatement> {
        let start = self.bump().span; // attempt
        let try_block = self.parse_block()?;

        let mut ensnare_clauses = Vec::new();
        loop {
            let mark = self.pos;
            self.skip_newlines();
            if !self.at(&TokenKind::Ensnare) {
                self.pos = mark;
                break;
            }
            let clause_start = self.bump().span;
            let mut condition = None;
            if self.eat(&TokenKind::LParen) {
                condition = Some(self.parse_expression()?);
                self.expect(&TokenKind::RParen)?;
            }
            let mut alias = None;
            if self.eat(&TokenKind::As) {
                alias = Some(self.expect_ident()?.0);
            }
            let body = self.parse_block()?;
            ensnare_clauses.push(EnsnareClause {
                condition,
                alias,
                body,
                span: self.span_from(clause_start),
            });
        }

        let mut resolve_block = None;
        let mark = self.pos;
        self.skip_newlines();
        if self.at(&TokenKind::Resolve) {
            self.bump();
            resolve_block = Some(self.parse_block()?);
        } else {
            self.pos = mark;
        }

        Ok(AttemptStatement {
            try_block,
            ensnare_clauses,
            resolve_block,
            span: self.span_from(start),
        })
    }

    fn parse_autoclose(&mut self) -> ParseResult<AutocloseStatement> {
        let start = self.bump().span; // autoclose
        let resource = self.parse_expression()?;
        self.expect(&TokenKind::As)?;
        let (variable, _) = self.expect_ident()?;
        let body = self.parse_block()?;
        Ok(AutocloseStatement {
            resource,
            variable,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_import(&mut self) -> ParseResult<ImportStatement> {
        let start = self.bump().span; // import
        let path = match self.peek() {
            TokenKind::Str(_) => {
                let tok = self.bump();
                let TokenKind::Str(path) = tok.kind else {
                    unreachable!()
                };
                path
            }
            other => {
                let msg = format!("expected import path string, found {}", other.describe());
                self.error(msg, self.current_span());
                return Err(());
            }
        };
        let mut imported_name = None;
        if self.eat(&TokenKind::Dot) {
            imported_name = Some(self.expect_ident()?.0);
        }
        let mut alias = None;
        if self.eat(&TokenKind::As) {
            alias = Some(self.expect_ident()?.0);
        }
        self.end_statement()?;
        Ok(ImportStatement {
            path,
            imported_name,
            alias,
            span: self.span_from(start),
        })
    }

    fn parse_match(&mut self) -> ParseResult<MatchStatement> {
        let start = self.bump().span; // match
        let value = self.parse_expression()?;
        self.expect(&TokenKind::Colon)?;
        self.skip_newlines();
        if !self.eat(&TokenKind::Indent) {
            self.error("expected indented match body", self.current_span());
            return Err(());
        }

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::Dedent => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Case => {
                    let case_start = self.bump().span;
                    let condition = self.parse_expression()?;
                    let body = self.parse_block()?;
                    cases.push(CaseClause {
                        condition,
                        body,
                        span: self.span_from(case_start),
                    });
                }
                TokenKind::Ident(name) if name == "default" => {
                    self.bump();
                    default = Some(self.parse_block()?);
                }
                other => {
                    let msg = format!("expected case or default, found {}", other.describe());
                    self.error(msg, self.current_span());
                    self.synchronize();
                }
            }
        }

        Ok(MatchStatement {
            value,
            cases,
            default,
            span: self.span_from(start),
        })
    }

    fn parse_main(&mut self) -> ParseResult<MainStatement> {
        let start = self.bump().span; // main
        let body = self.parse_block()?;
        Ok(MainStatement {
            body,
            span: self.span_from(start),
        })
    }

    fn parse_global(&mut self) -> ParseResult<GlobalStatement> {
        let start = self.bump().span; // global
        let mut names = vec![self.expect_ident()?.0];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?.0);
        }
        self.end_statement()?;
        Ok(GlobalStatement {
            names,
            span: self.span_from(start),
        })
    }

    fn parse_raise(&mut self) -> ParseResult<RaiseStatement> {
        let start = self.bump().span; // raise
        let value = if matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.end_statement()?;
        Ok(RaiseStatement {
            value,
            span: self.span_from(start),
        })
    }

    fn parse_check(&mut self) -> ParseResult<CheckStatement> {
        let start = self.bump().span; // check
        let condition = self.parse_expression()?;
        let message = if self.eat(&TokenKind::Comma) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.end_statement()?;
        Ok(CheckStatement {
            condition,
            message,
            span: self.span_from(start),
        })
    }

    fn parse_expression_or_assign(&mut self) -> ParseResult<Statement> {
        let start = self.current_span();
        let target = self.parse_expression()?;

        let operator = match self.peek() {
            TokenKind::Assign => "=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            _ => {
                self.end_statement()?;
                let span = self.span_from(start);
                return Ok(Statement::Expression(ExpressionStatement {
                    expression: target,
                    span,
                }));
            }
        }
        .to_string();
        self.bump();

        let value = self.parse_expression()?;
        self.end_statement()?;
        Ok(Statement::Assign(AssignStatement {
            target,
            operator,
            value,
            span: self.span_from(start),
        }))
    }
}

#[cfg(test)]
mod tests;
