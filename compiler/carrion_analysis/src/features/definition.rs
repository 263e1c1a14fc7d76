//! Go-to-definition over document symbols.

use super::word_at;
use crate::store::Document;
use lsp_types::{Location, Position};

/// Zero or one location: grimoires, then spells, then variables.
pub fn definition(doc: &Document, position: Position) -> Vec<Location> {
    let Some(word) = word_at(&doc.text, position) else {
        return Vec::new();
    };

    let range = if let Some(class) = doc.symbols.classes.get(&word) {
        class.range
    } else if let Some(function) = doc.symbols.functions.get(&word) {
        function.range
    } else if let Some(variable) = doc.symbols.variables.get(&word) {
        variable.range
    } else {
        return Vec::new();
    };

    vec![Location {
        uri: doc.uri.clone(),
        range,
    }]
}
