//! Document outline: grimoires with their spells as children, plus
//! top-level spells.

use crate::store::Document;
use lsp_types::{DocumentSymbol, SymbolKind};

pub fn document_symbols(doc: &Document) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();

    let mut class_names: Vec<&String> = doc.symbols.classes.keys().collect();
    class_names.sort();
    for name in class_names {
        let class = &doc.symbols.classes[name];
        let mut children = Vec::new();
        let mut method_names: Vec<&String> = class.methods.keys().collect();
        method_names.sort();
        for method_name in method_names {
            let method = &class.methods[method_name];
            children.push(symbol(
                method.name.clone(),
                SymbolKind::METHOD,
                method.range,
                None,
            ));
        }
        symbols.push(symbol(
            class.name.clone(),
            SymbolKind::CLASS,
            class.range,
            Some(children),
        ));
    }

    let mut function_names: Vec<&String> = doc.symbols.functions.keys().collect();
    function_names.sort();
    for name in function_names {
        let function = &doc.symbols.functions[name];
        if function.owner_class.is_some() {
            continue;
        }
        symbols.push(symbol(
            function.name.clone(),
            SymbolKind::FUNCTION,
            function.range,
            None,
        ));
    }

    symbols
}

fn symbol(
    name: String,
    kind: SymbolKind,
    range: lsp_types::Range,
    children: Option<Vec<DocumentSymbol>>,
) -> DocumentSymbol {
    #[allow(deprecated)]
    DocumentSymbol {
        name,
        detail: None,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range: range,
        children,
    }
}
