//! Shared IR for the Carrion toolchain.
//!
//! Everything downstream of the lexer speaks these types: byte [`Span`]s,
//! the [`Token`] stream, the [`ast`] nodes, and the [`LineIndex`] that maps
//! byte offsets to zero-based line/character positions.
//!
//! Names are plain `String`s throughout. The symbol engine keys its tables
//! by identifier text, so interning would only add indirection here.

pub mod ast;
mod position;
mod span;
mod token;

pub use position::{LineIndex, Position};
pub use span::Span;
pub use token::{Token, TokenKind};
