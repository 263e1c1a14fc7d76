//! Document formatting: whole-text replacement edits.

use crate::store::Document;
use carrion_fmt::{format_source, FormatConfig};
use lsp_types::{FormattingOptions, Position, Range, TextEdit};

/// Format the document. No edits when the source does not parse cleanly
/// or is already canonical.
pub fn formatting(doc: &Document, options: &FormattingOptions) -> Vec<TextEdit> {
    let config = config_from(options);
    let Ok(formatted) = format_source(&doc.text, &config) else {
        return Vec::new();
    };
    if formatted == doc.text {
        return Vec::new();
    }

    let end = doc.line_index.position(doc.line_index.len());
    vec![TextEdit {
        range: Range {
            start: Position::new(0, 0),
            end: Position::new(end.line, end.character),
        },
        new_text: formatted,
    }]
}

fn config_from(options: &FormattingOptions) -> FormatConfig {
    FormatConfig {
        tab_size: options.tab_size,
        insert_spaces: options.insert_spaces,
        trim_trailing_whitespace: options.trim_trailing_whitespace.unwrap_or(true),
        insert_final_newline: options.insert_final_newline.unwrap_or(true),
        trim_final_newlines: options.trim_final_newlines.unwrap_or(true),
    }
}
