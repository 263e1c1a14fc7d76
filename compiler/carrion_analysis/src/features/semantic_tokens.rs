//! Semantic tokens: the 5-integer delta encoding over the token stream.

use crate::store::Document;
use carrion_ir::TokenKind;
use lsp_types::SemanticToken;

/// Legend token types, in index order.
pub const TOKEN_TYPES: [&str; 10] = [
    "keyword",
    "string",
    "number",
    "operator",
    "variable",
    "function",
    "class",
    "parameter",
    "property",
    "comment",
];

/// Legend token modifiers, in bit order.
pub const TOKEN_MODIFIERS: [&str; 4] = ["definition", "readonly", "static", "deprecated"];

/// Legend index for a lexed token, or `None` to skip it.
fn token_type_index(kind: &TokenKind) -> Option<u32> {
    if kind.is_keyword() {
        return Some(0);
    }
    if kind.is_operator() {
        return Some(3);
    }
    match kind {
        TokenKind::Str(_) | TokenKind::DocString(_) => Some(1),
        TokenKind::Int(_) | TokenKind::Float(_) => Some(2),
        TokenKind::Ident(_) => Some(4),
        _ => None,
    }
}

/// Emit tokens with line/start deltas relative to the previously emitted
/// token (the first is absolute).
pub fn semantic_tokens(doc: &Document) -> Vec<SemanticToken> {
    let mut data = Vec::new();
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in &doc.tokens {
        let Some(token_type) = token_type_index(&token.kind) else {
            continue;
        };
        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.column - prev_start
        } else {
            token.column
        };
        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.span.len(),
            token_type,
            token_modifiers_bitset: 0,
        });
        prev_line = token.line;
        prev_start = token.column;
    }

    data
}
