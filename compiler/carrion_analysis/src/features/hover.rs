//! Hover: word-at-cursor lookup with a markdown body.

use super::word_at;
use crate::catalog::{render_params, Catalog};
use crate::store::Document;
use crate::symbols::render_param_symbols;
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

/// Lookup order: catalog builtins, catalog grimoires, document grimoires,
/// document spells, document variables. Absent when nothing matches.
pub fn hover(doc: &Document, catalog: &Catalog, position: Position) -> Option<Hover> {
    let word = word_at(&doc.text, position)?;

    let body = if let Some(builtin) = catalog.builtins.get(&word) {
        format!(
            "**{}**: function\n\n```carrion\n{}({}) -> {}\n```\n\n{}",
            builtin.name,
            builtin.name,
            render_params(&builtin.params),
            builtin.return_type,
            builtin.description
        )
    } else if let Some(class) = catalog.classes.get(&word) {
        format!("**{}**: Grimoire\n\n{}", class.name, class.description)
    } else if let Some(class) = doc.symbols.classes.get(&word) {
        let mut content = format!("**{}**: Grimoire", class.name);
        if let Some(doc_string) = &class.doc_string {
            content.push_str(&format!("\n\n{doc_string}"));
        }
        if let Some(parent) = &class.inherits {
            content.push_str(&format!("\n\nInherits from: {parent}"));
        }
        content
    } else if let Some(function) = doc.symbols.functions.get(&word) {
        let mut content = format!(
            "**{}**: Spell\n\n```carrion\nspell {}({}) -> {}\n```",
            function.name,
            function.name,
            render_param_symbols(&function.params),
            function.return_type
        );
        if let Some(doc_string) = &function.doc_string {
            content.push_str(&format!("\n\n{doc_string}"));
        }
        content
    } else if let Some(variable) = doc.symbols.variables.get(&word) {
        format!(
            "**{}**: Variable\n\nType: {}",
            variable.name, variable.type_name
        )
    } else {
        return None;
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: body,
        }),
        range: None,
    })
}
