//! Completion: context classification and item synthesis.
//!
//! The prefix (line text up to the cursor) picks the mode: a trailing `.`
//! means member completion against the resolved receiver, a trailing `(`
//! would be argument completion (not offered in this release), anything
//! else is general completion filtered by the trailing match token.

use super::{line_at, match_token, prefix_of};
use crate::catalog::{render_params, Catalog, ClassDescriptor};
use crate::store::Document;
use crate::symbols::{render_param_symbols, ClassSymbol};
use lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, InsertTextFormat, Position,
};
use rustc_hash::FxHashSet;

/// Reserved words offered by general completion, in canonical order.
pub const RESERVED_WORDS: [&str; 35] = [
    "spell",
    "grim",
    "init",
    "self",
    "if",
    "otherwise",
    "else",
    "for",
    "in",
    "while",
    "return",
    "attempt",
    "ensnare",
    "resolve",
    "raise",
    "import",
    "as",
    "match",
    "case",
    "stop",
    "skip",
    "ignore",
    "True",
    "False",
    "None",
    "and",
    "or",
    "not",
    "main",
    "global",
    "autoclose",
    "arcane",
    "arcanespell",
    "super",
    "check",
];

/// Snippet bodies for the structural keywords.
fn keyword_snippet(keyword: &str) -> Option<&'static str> {
    Some(match keyword {
        "spell" => "spell ${1:name}(${2:params}):\n\t${3:body}",
        "grim" => "grim ${1:ClassName}:\n\tinit(${2:params}):\n\t\t${3:body}",
        "if" => "if ${1:condition}:\n\t${2:body}",
        "for" => "for ${1:var} in ${2:iterable}:\n\t${3:body}",
        "while" => "while ${1:condition}:\n\t${2:body}",
        "attempt" => "attempt:\n\t${1:try_body}\nensnare:\n\t${2:except_body}",
        "autoclose" => "autoclose ${1:resource} as ${2:var}:\n\t${3:body}",
        _ => return None,
    })
}

/// Primitive type → the catalog grimoire that shadows it with methods.
fn primitive_shadow(type_name: &str) -> Option<&'static str> {
    Some(match type_name {
        "string" => "String",
        "int" => "Integer",
        "float" => "Float",
        "bool" => "Boolean",
        "array" => "Array",
        _ => return None,
    })
}

pub fn completion(doc: &Document, catalog: &Catalog, position: Position) -> Vec<CompletionItem> {
    let Some(line) = line_at(&doc.text, position.line) else {
        return Vec::new();
    };
    let prefix = prefix_of(line, position.character);

    if prefix.ends_with('.') {
        member_completions(doc, catalog, prefix)
    } else if prefix.ends_with('(') {
        // Argument completion is not offered in this release.
        Vec::new()
    } else {
        general_completions(doc, catalog, prefix)
    }
}

/// Accumulates items, deduplicating by label in insertion order.
struct Items {
    out: Vec<CompletionItem>,
    seen: FxHashSet<String>,
}

impl Items {
    fn new() -> Self {
        Items {
            out: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    fn push(&mut self, item: CompletionItem) {
        if self.seen.insert(item.label.clone()) {
            self.out.push(item);
        }
    }
}

fn member_completions(doc: &Document, catalog: &Catalog, prefix: &str) -> Vec<CompletionItem> {
    let receiver = prefix
        .trim_end_matches('.')
        .split_whitespace()
        .last()
        .unwrap_or("");
    if receiver.is_empty() {
        return Vec::new();
    }

    let mut items = Items::new();

    // Receiver names a catalog grimoire directly (File., OS., ...).
    if let Some(class) = catalog.classes.get(receiver) {
        push_catalog_methods(&mut items, class);
    }

    // Receiver is a variable with a known type.
    if let Some(variable) = doc.symbols.variables.get(receiver) {
        if let Some(class) = doc.symbols.classes.get(&variable.type_name) {
            push_document_methods(&mut items, class);
        }
        if let Some(class) = catalog.classes.get(&variable.type_name) {
            push_catalog_methods(&mut items, class);
        }
        if let Some(shadow) = primitive_shadow(&variable.type_name) {
            if let Some(class) = catalog.classes.get(shadow) {
                push_catalog_methods(&mut items, class);
            }
        }
    }

    items.out
}

fn push_catalog_methods(items: &mut Items, class: &ClassDescriptor) {
    let mut names: Vec<&String> = class.methods.keys().collect();
    names.sort();
    for name in names {
        let method = &class.methods[name];
        items.push(CompletionItem {
            label: method.name.clone(),
            kind: Some(CompletionItemKind::METHOD),
            detail: Some(format!(
                "spell {}({}) -> {}",
                method.name,
                render_params(&method.params),
                method.return_type
            )),
            documentation: Some(Documentation::String(method.description.clone())),
            insert_text: Some(format!("{}(${{1}})", method.name)),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        });
    }
}

fn push_document_methods(items: &mut Items, class: &ClassSymbol) {
    let mut names: Vec<&String> = class.methods.keys().collect();
    names.sort();
    for name in names {
        let method = &class.methods[name];
        items.push(CompletionItem {
            label: method.name.clone(),
            kind: Some(CompletionItemKind::METHOD),
            detail: Some(format!(
                "spell {}({}) -> {}",
                method.name,
                render_param_symbols(&method.params),
                method.return_type
            )),
            documentation: method
                .doc_string
                .clone()
                .map(Documentation::String),
            insert_text: Some(format!("{}(${{1}})", method.name)),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        });
    }
}

fn general_completions(doc: &Document, catalog: &Catalog, prefix: &str) -> Vec<CompletionItem> {
    let token = match_token(prefix);
    let lowered = token.to_lowercase();
    let mut items = Items::new();

    for keyword in RESERVED_WORDS {
        if !keyword.to_lowercase().starts_with(&lowered) {
            continue;
        }
        match keyword_snippet(keyword) {
            Some(snippet) => items.push(CompletionItem {
                label: keyword.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                insert_text: Some(snippet.to_string()),
                insert_text_format: Some(InsertTextFormat::SNIPPET),
                ..Default::default()
            }),
            None => items.push(CompletionItem {
                label: keyword.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                insert_text: Some(keyword.to_string()),
                ..Default::default()
            }),
        }
    }

    let mut builtin_names: Vec<&String> = catalog.builtins.keys().collect();
    builtin_names.sort();
    for name in builtin_names {
        if !name.starts_with(token) {
            continue;
        }
        let builtin = &catalog.builtins[name];
        items.push(CompletionItem {
            label: builtin.name.clone(),
            kind: Some(CompletionItemKind::FUNCTION),
            detail: Some(format!(
                "{}({}) -> {}",
                builtin.name,
                render_params(&builtin.params),
                builtin.return_type
            )),
            documentation: Some(Documentation::String(builtin.description.clone())),
            insert_text: Some(format!("{}(${{1}})", builtin.name)),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        });
    }

    let mut class_names: Vec<&String> = catalog.classes.keys().collect();
    class_names.sort();
    for name in class_names {
        if !name.starts_with(token) {
            continue;
        }
        let class = &catalog.classes[name];
        items.push(CompletionItem {
            label: class.name.clone(),
            kind: Some(CompletionItemKind::CLASS),
            detail: Some(format!("grim {}", class.name)),
            documentation: Some(Documentation::String(class.description.clone())),
            ..Default::default()
        });
    }

    let mut doc_class_names: Vec<&String> = doc.symbols.classes.keys().collect();
    doc_class_names.sort();
    for name in doc_class_names {
        if !name.starts_with(token) {
            continue;
        }
        let class = &doc.symbols.classes[name];
        items.push(CompletionItem {
            label: class.name.clone(),
            kind: Some(CompletionItemKind::CLASS),
            detail: Some(format!("grim {}", class.name)),
            documentation: class.doc_string.clone().map(Documentation::String),
            ..Default::default()
        });
    }

    let mut function_names: Vec<&String> = doc.symbols.functions.keys().collect();
    function_names.sort();
    for name in function_names {
        if !name.starts_with(token) {
            continue;
        }
        let function = &doc.symbols.functions[name];
        items.push(CompletionItem {
            label: function.name.clone(),
            kind: Some(CompletionItemKind::FUNCTION),
            detail: Some(format!(
                "spell {}({}) -> {}",
                function.name,
                render_param_symbols(&function.params),
                function.return_type
            )),
            documentation: function.doc_string.clone().map(Documentation::String),
            insert_text: Some(format!("{}(${{1}})", function.name)),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        });
    }

    let mut variable_names: Vec<&String> = doc.symbols.variables.keys().collect();
    variable_names.sort();
    for name in variable_names {
        if !name.starts_with(token) {
            continue;
        }
        let variable = &doc.symbols.variables[name];
        items.push(CompletionItem {
            label: variable.name.clone(),
            kind: Some(CompletionItemKind::VARIABLE),
            detail: Some(format!("{}: {}", variable.name, variable.type_name)),
            ..Default::default()
        });
    }

    items.out
}
