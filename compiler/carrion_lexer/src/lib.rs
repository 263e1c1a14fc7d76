//! Lexer for Carrion source.
//!
//! Two phases, following the raw/convert split: a logos tokenizer produces
//! [`raw::RawToken`]s, and [`lex`] converts them into [`Token`]s, cooking
//! literals and synthesizing `Indent`/`Dedent` from leading whitespace
//! (Carrion blocks are introduced by `:` and delimited by indentation).
//!
//! Invalid input produces `TokenKind::Error` tokens; the lexer always
//! continues to end of input. Blank and comment-only lines never change
//! indentation depth.

mod convert;
mod raw;

use carrion_ir::{Span, Token, TokenKind};
use logos::Logos;
use raw::RawToken;

/// Lex source text into a token vector ending with `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut state = LexState::new(source);
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();
        match result {
            Ok(raw) => state.push_raw(&mut out, raw, slice, span),
            Err(()) => {
                state.flush_pending(&mut out, span.start);
                out.push(state.token(TokenKind::Error, span));
                state.advance_over(slice, span);
            }
        }
    }

    state.finish(&mut out, source.len() as u32);
    out
}

/// Line, column and indentation bookkeeping threaded through conversion.
struct LexState {
    line: u32,
    line_start: u32,
    indent_stack: Vec<u32>,
    /// Indentation width of the current line, unresolved until the first
    /// real token of the line shows the line is not blank.
    pending_indent: Option<u32>,
    /// Open `([{` nesting. Line breaks inside brackets are implicit
    /// joins: no `Newline`, no indentation tracking.
    bracket_depth: u32,
}

impl LexState {
    fn new(source: &str) -> Self {
        // The skip rule swallows leading whitespace on the very first
        // line, so measure it here.
        let first_indent = source
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count() as u32;
        LexState {
            line: 0,
            line_start: 0,
            indent_stack: vec![0],
            pending_indent: (first_indent > 0).then_some(first_indent),
            bracket_depth: 0,
        }
    }

    fn token(&self, kind: TokenKind, span: Span) -> Token {
        Token::new(kind, span, self.line, span.start - self.line_start)
    }

    /// Resolve a pending line indentation against the stack, emitting
    /// `Indent`/`Dedent` tokens at `offset`.
    fn flush_pending(&mut self, out: &mut Vec<Token>, offset: u32) {
        let Some(width) = self.pending_indent.take() else {
            return;
        };
        let top = *self.indent_stack.last().unwrap_or(&0);
        let span = Span::point(offset);
        if width > top {
            self.indent_stack.push(width);
            out.push(self.token(TokenKind::Indent, span));
        } else {
            while self.indent_stack.len() > 1 && width < *self.indent_stack.last().unwrap() {
                self.indent_stack.pop();
                out.push(self.token(TokenKind::Dedent, span));
            }
        }
    }

    /// Update line bookkeeping for a slice that may contain newlines
    /// (docstrings span lines).
    fn advance_over(&mut self, slice: &str, span: Span) {
        let newlines = slice.bytes().filter(|b| *b == b'\n').count() as u32;
        if newlines > 0 {
            self.line += newlines;
            let last_nl = slice.rfind('\n').unwrap() as u32;
            self.line_start = span.start + last_nl + 1;
        }
    }

    fn push_raw(&mut self, out: &mut Vec<Token>, raw: RawToken, slice: &str, span: Span) {
        if raw == RawToken::NewlineIndent {
            // Span just the line break itself; the trailing whitespace is
            // the next line's indentation.
            let nl_len = if slice.starts_with("\r\n") { 2 } else { 1 };
            let nl_span = Span::new(span.start, span.start + nl_len);
            if self.bracket_depth == 0 {
                out.push(self.token(TokenKind::Newline, nl_span));
            }
            self.line += 1;
            self.line_start = span.start + nl_len;
            if self.bracket_depth == 0 {
                self.pending_indent = Some(span.end - self.line_start);
            }
            return;
        }

        self.flush_pending(out, span.start);
        let kind = convert::convert(raw, slice);
        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                self.bracket_depth += 1;
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
            }
            _ => {}
        }
        out.push(self.token(kind, span));
        self.advance_over(slice, span);
    }

    /// Close the stream: terminate the last line, drain open indents,
    /// append `Eof`.
    fn finish(mut self, out: &mut Vec<Token>, end: u32) {
        let span = Span::point(end);
        if !matches!(
            out.last().map(|t| &t.kind),
            None | Some(TokenKind::Newline)
        ) {
            out.push(self.token(TokenKind::Newline, span));
        }
        self.pending_indent = Some(0);
        self.flush_pending(out, end);
        out.push(self.token(TokenKind::Eof, span));
    }
}

#[cfg(test)]
mod tests;
