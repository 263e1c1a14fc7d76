//! Logos-derived raw tokenizer.
//!
//! The raw layer knows nothing about indentation: `NewlineIndent` captures
//! a line break together with the following line's leading whitespace, and
//! [`crate::lex`] turns those into `Newline`/`Indent`/`Dedent` tokens.

use logos::{Lexer, Logos};

/// Consume a docstring body up to and including the closing `"""`.
/// An unterminated docstring runs to end of input.
fn lex_docstring(lex: &mut Lexer<RawToken>) -> bool {
    match lex.remainder().find("\"\"\"") {
        Some(end) => lex.bump(end + 3),
        None => lex.bump(lex.remainder().len()),
    }
    true
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
#[logos(skip r"#[^\n]*")]
pub enum RawToken {
    /// Line break plus the next line's leading whitespace.
    #[regex(r"\r?\n[ \t]*")]
    NewlineIndent,

    #[token("\"\"\"", lex_docstring)]
    DocString,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
}
