//! Feature providers: the per-request read paths.
//!
//! Every provider takes a document snapshot plus a catalog snapshot and
//! returns protocol values. Absent documents and out-of-range positions
//! yield empty results, never errors.

pub mod completion;
pub mod definition;
pub mod document_symbols;
pub mod formatting;
pub mod hover;
pub mod semantic_tokens;

use lsp_types::Position;

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// The requested line of `text`, without its newline.
pub(crate) fn line_at(text: &str, line: u32) -> Option<&str> {
    text.split('\n').nth(line as usize).map(|l| l.trim_end_matches('\r'))
}

/// The line's prefix up to the cursor. A cursor past the end of the line
/// uses the entire line.
pub(crate) fn prefix_of(line: &str, character: u32) -> &str {
    let character = character as usize;
    if character <= line.len() {
        &line[..character]
    } else {
        line
    }
}

/// The maximal identifier run containing the cursor, or `None` when the
/// cursor is past the end of the line or not touching a word.
pub(crate) fn word_at(text: &str, position: Position) -> Option<String> {
    let line = line_at(text, position.line)?;
    let bytes = line.as_bytes();
    let cursor = position.character as usize;
    if cursor >= bytes.len() {
        return None;
    }

    let mut start = cursor;
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = cursor;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    if start >= end {
        return None;
    }
    Some(line[start..end].to_string())
}

/// The longest trailing identifier-character run of the prefix.
pub(crate) fn match_token(prefix: &str) -> &str {
    let bytes = prefix.as_bytes();
    let mut start = bytes.len();
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    &prefix[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_at_expands_both_directions() {
        let text = "value = some_name + 1\n";
        // Cursor in the middle of some_name.
        assert_eq!(
            word_at(text, Position::new(0, 11)),
            Some("some_name".to_string())
        );
        // Cursor just after the word still finds it.
        assert_eq!(
            word_at(text, Position::new(0, 17)),
            Some("some_name".to_string())
        );
    }

    #[test]
    fn word_at_none_past_line_end_or_on_blank() {
        assert_eq!(word_at("ab\n", Position::new(0, 2)), None);
        assert_eq!(word_at("\n", Position::new(0, 0)), None);
        assert_eq!(word_at("x\n", Position::new(5, 0)), None);
    }

    #[test]
    fn match_token_takes_trailing_run() {
        assert_eq!(match_token("result = p"), "p");
        assert_eq!(match_token("result = "), "");
        assert_eq!(match_token("pri"), "pri");
        assert_eq!(match_token("a.b"), "b");
    }

    #[test]
    fn prefix_clamps_past_line_end() {
        assert_eq!(prefix_of("abc", 2), "ab");
        assert_eq!(prefix_of("abc", 99), "abc");
    }
}
