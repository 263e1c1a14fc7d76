//! End-to-end scenarios against a real engine: the catalog boots the
//! bundled stdlib, documents go through the full update pipeline, and
//! feature providers answer from the stored records.

use carrion_analysis::features::{
    completion::completion, definition::definition, document_symbols::document_symbols,
    formatting::formatting, hover::hover, semantic_tokens::semantic_tokens,
};
use carrion_analysis::{CatalogLoader, Document, DocumentStore, PackageProber};
use lsp_types::{
    CompletionItemKind, FormattingOptions, InsertTextFormat, Position, SymbolKind, Url,
};
use std::sync::Arc;

struct Engine {
    catalog: Arc<CatalogLoader>,
    store: DocumentStore,
}

fn engine() -> Engine {
    let catalog = Arc::new(CatalogLoader::new());
    let prober = Arc::new(PackageProber::with_search_paths(catalog.clone(), Vec::new()));
    let store = DocumentStore::new(catalog.clone(), prober);
    Engine { catalog, store }
}

fn open(engine: &Engine, text: &str) -> Arc<Document> {
    let uri = Url::parse("file:///t.crl").unwrap();
    let (doc, _diags) = engine.store.update(uri, text.to_string(), None);
    doc
}

fn default_options() -> FormattingOptions {
    FormattingOptions {
        tab_size: 4,
        insert_spaces: true,
        ..Default::default()
    }
}

#[test]
fn member_completion_on_local_string() {
    let engine = engine();
    let doc = open(
        &engine,
        "spell test():\n    message = \"hello\"\n    message.\n",
    );

    let items = completion(&doc, &engine.catalog.snapshot(), Position::new(2, 12));
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

    for expected in ["lower", "upper", "split", "contains", "length"] {
        assert!(labels.contains(&expected), "missing {expected} in {labels:?}");
    }
    for item in &items {
        assert_eq!(item.kind, Some(CompletionItemKind::METHOD));
        let insert = item.insert_text.as_deref().expect("snippet insert text");
        assert_eq!(insert, &format!("{}(${{1}})", item.label));
        assert_eq!(item.insert_text_format, Some(InsertTextFormat::SNIPPET));
    }
}

#[test]
fn constructor_type_inference_member_completion() {
    let engine = engine();
    let doc = open(
        &engine,
        "grim Person:\n    init(name):\n        self.name = name\n    spell greet():\n        return \"hi\"\n\nspell t():\n    p = Person(\"Alice\")\n    p.\n",
    );

    let items = completion(&doc, &engine.catalog.snapshot(), Position::new(8, 6));
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["greet"], "expected exactly greet, got {labels:?}");
}

#[test]
fn general_prefix_match_offers_print() {
    let engine = engine();
    let doc = open(&engine, "result = p");

    let items = completion(&doc, &engine.catalog.snapshot(), Position::new(0, 10));
    let print = items
        .iter()
        .find(|i| i.label == "print")
        .expect("print offered");
    assert_eq!(print.kind, Some(CompletionItemKind::FUNCTION));

    for item in &items {
        assert!(
            item.label.to_lowercase().starts_with('p'),
            "label {} does not match prefix p",
            item.label
        );
    }
}

#[test]
fn completion_labels_are_unique() {
    let engine = engine();
    // A document spell shadowing a builtin name must not duplicate it.
    let doc = open(&engine, "spell print(x):\n    return x\n\nresult = p");
    let items = completion(&doc, &engine.catalog.snapshot(), Position::new(3, 10));
    let mut labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    let total = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), total, "duplicate labels in completion reply");
}

#[test]
fn member_completion_on_arcane_grimoire_name() {
    let engine = engine();
    let doc = open(&engine, "spell t():\n    File.\n");
    let items = completion(&doc, &engine.catalog.snapshot(), Position::new(1, 9));
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    for expected in ["read", "write", "exists", "open"] {
        assert!(labels.contains(&expected), "missing {expected}");
    }
}

#[test]
fn argument_completion_is_empty_this_release() {
    let engine = engine();
    let doc = open(&engine, "spell t():\n    print(\n");
    let items = completion(&doc, &engine.catalog.snapshot(), Position::new(1, 10));
    assert!(items.is_empty());
}

#[test]
fn formatter_idempotence_via_the_feature() {
    let engine = engine();
    let doc = open(&engine, "spell greet(name):\n    return \"Hello, \"+name\n");

    let edits = formatting(&doc, &default_options());
    assert_eq!(edits.len(), 1);
    let formatted = &edits[0].new_text;
    assert!(
        formatted.ends_with("    return \"Hello, \" + name\n"),
        "unexpected formatted tail: {formatted:?}"
    );

    let reopened = open(&engine, formatted);
    assert!(
        formatting(&reopened, &default_options()).is_empty(),
        "second format must be a no-op"
    );
}

#[test]
fn document_symbols_with_nesting() {
    let engine = engine();
    let doc = open(
        &engine,
        "grim P:\n    init(n):\n        self.n = n\n    spell g():\n        return n\n\nspell t():\n    return 1\n",
    );

    let symbols = document_symbols(&doc);
    assert_eq!(symbols.len(), 2);

    let class = &symbols[0];
    assert_eq!(class.name, "P");
    assert_eq!(class.kind, SymbolKind::CLASS);
    let children = class.children.as_ref().expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "g");
    assert_eq!(children[0].kind, SymbolKind::METHOD);

    let function = &symbols[1];
    assert_eq!(function.name, "t");
    assert_eq!(function.kind, SymbolKind::FUNCTION);
}

#[test]
fn document_symbol_ranges_lie_within_text() {
    let engine = engine();
    let text = "grim P:\n    spell g():\n        return 1\n\nspell t():\n    return 1\n";
    let doc = open(&engine, text);
    let last_line = text.lines().count() as u32;

    for symbol in document_symbols(&doc) {
        assert!(symbol.range.end.line <= last_line);
        for child in symbol.children.unwrap_or_default() {
            assert!(child.range.end.line <= last_line);
        }
    }
}

#[test]
fn catalog_refresh_only_grows_completions() {
    let engine = engine();
    let doc = open(&engine, "result = p");

    let before = completion(&doc, &engine.catalog.snapshot(), Position::new(0, 10)).len();
    engine.catalog.refresh();
    let after = completion(&doc, &engine.catalog.snapshot(), Position::new(0, 10)).len();
    assert!(after >= before, "refresh dropped completions: {before} -> {after}");
}

#[test]
fn hover_on_builtin_and_document_symbols() {
    let engine = engine();
    let doc = open(
        &engine,
        "spell shout(text):\n    \"\"\"Make it loud.\"\"\"\n    return text\n\nmsg = \"hi\"\nprint(msg)\n",
    );
    let catalog = engine.catalog.snapshot();

    // Builtin (the `print` call on line 5).
    let hover_print = hover(&doc, &catalog, Position::new(5, 1)).expect("builtin hover");
    let lsp_types::HoverContents::Markup(content) = &hover_print.contents else {
        panic!("expected markdown hover");
    };
    assert!(content.value.contains("**print**: function"));
    assert!(content.value.contains("```carrion"));

    // Document spell.
    let hover_shout = hover(&doc, &catalog, Position::new(0, 7)).expect("spell hover");
    let lsp_types::HoverContents::Markup(content) = &hover_shout.contents else {
        panic!();
    };
    assert!(content.value.contains("**shout**: Spell"));
    assert!(content.value.contains("Make it loud."));

    // Variable.
    let hover_msg = hover(&doc, &catalog, Position::new(4, 1)).expect("variable hover");
    let lsp_types::HoverContents::Markup(content) = &hover_msg.contents else {
        panic!();
    };
    assert!(content.value.contains("**msg**: Variable"));
    assert!(content.value.contains("Type: string"));
}

#[test]
fn hover_on_catalog_grimoire() {
    let engine = engine();
    let doc = open(&engine, "x = String(\"a\")\n");
    let found = hover(&doc, &engine.catalog.snapshot(), Position::new(0, 5)).expect("hover");
    let lsp_types::HoverContents::Markup(content) = &found.contents else {
        panic!();
    };
    assert!(content.value.contains("**String**: Grimoire"));
}

#[test]
fn definition_finds_document_symbols_only() {
    let engine = engine();
    let doc = open(
        &engine,
        "grim Person:\n    spell greet():\n        return \"hi\"\n\nspell t():\n    p = Person(\"a\")\n    return p\n",
    );

    // `Person` on line 5 resolves to the grimoire definition.
    let locations = definition(&doc, Position::new(5, 9));
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].range.start.line, 0);

    // A builtin has no in-document definition.
    let doc2 = open(&engine, "print(1)\n");
    assert!(definition(&doc2, Position::new(0, 2)).is_empty());
}

#[test]
fn semantic_tokens_are_well_formed() {
    let engine = engine();
    let doc = open(
        &engine,
        "spell f(x):\n    y = x + 1\n    return \"done\"\n",
    );

    let tokens = semantic_tokens(&doc);
    assert!(!tokens.is_empty());
    for token in &tokens {
        assert!(
            (token.token_type as usize)
                < carrion_analysis::features::semantic_tokens::TOKEN_TYPES.len()
        );
        assert!(token.length > 0);
    }
}

#[test]
fn semantic_token_deltas_encode_positions() {
    let engine = engine();
    let doc = open(&engine, "x = 1\ny = 2\n");
    let tokens = semantic_tokens(&doc);

    // x(ident) =(op) 1(num) / y(ident) =(op) 2(num)
    let kinds: Vec<u32> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(kinds, vec![4, 3, 2, 4, 3, 2]);

    // First token is absolute.
    assert_eq!((tokens[0].delta_line, tokens[0].delta_start), (0, 0));
    // `=` is two columns after `x` on the same line.
    assert_eq!((tokens[1].delta_line, tokens[1].delta_start), (0, 2));
    // `y` starts the next line at column 0.
    assert_eq!((tokens[3].delta_line, tokens[3].delta_start), (1, 0));
}

mod boundaries {
    use super::*;

    #[test]
    fn cursor_on_empty_line_gets_general_items_and_no_hover() {
        let engine = engine();
        let doc = open(&engine, "x = 1\n\ny = 2\n");
        let catalog = engine.catalog.snapshot();

        let items = completion(&doc, &catalog, Position::new(1, 0));
        assert!(!items.is_empty());
        assert!(items.iter().any(|i| i.label == "spell"));
        assert!(hover(&doc, &catalog, Position::new(1, 0)).is_none());
    }

    #[test]
    fn cursor_past_line_end_uses_whole_line_and_no_hover() {
        let engine = engine();
        let doc = open(&engine, "spell test():\n    message = \"x\"\n    message.\n");
        let catalog = engine.catalog.snapshot();

        // Character 99 is past the end; the prefix is the whole line,
        // which still ends with a dot.
        let items = completion(&doc, &catalog, Position::new(2, 99));
        assert!(items.iter().any(|i| i.label == "lower"));
        assert!(hover(&doc, &catalog, Position::new(2, 99)).is_none());
    }

    #[test]
    fn empty_document_yields_empty_symbols_and_no_edits() {
        let engine = engine();
        let doc = open(&engine, "");
        assert!(document_symbols(&doc).is_empty());
        assert!(formatting(&doc, &default_options()).is_empty());
        assert!(semantic_tokens(&doc).is_empty());
    }

    #[test]
    fn parse_errors_keep_recovered_symbols_and_suppress_formatting() {
        let engine = engine();
        let uri = Url::parse("file:///broken.crl").unwrap();
        let (doc, diags) = engine.store.update(
            uri,
            "spell ok():\n    return 1\n\nx = = 1\n".to_string(),
            None,
        );
        assert!(!diags.is_empty());
        assert!(doc.symbols.functions.contains_key("ok"));
        assert!(formatting(&doc, &default_options()).is_empty());
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Completion labels stay unique for arbitrary identifier
        /// prefixes over a document of random assignments.
        #[test]
        fn completion_labels_unique_for_random_prefixes(
            names in prop::collection::vec("[a-z][a-z0-9_]{0,6}", 1..6),
            prefix in "[a-z]{0,3}",
        ) {
            let engine = engine();
            let text: String = names
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{name} = {i}\n"))
                .collect();
            let line = format!("r = {prefix}");
            let doc = open(&engine, &format!("{text}{line}"));

            let position = Position::new(names.len() as u32, line.len() as u32);
            let items = completion(&doc, &engine.catalog.snapshot(), position);
            let mut labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
            let total = labels.len();
            labels.sort();
            labels.dedup();
            prop_assert_eq!(labels.len(), total);
        }

        /// Semantic tokens always carry valid legend indices and
        /// nonzero lengths, whatever the source looks like.
        #[test]
        fn semantic_tokens_valid_for_random_documents(
            lines in prop::collection::vec("[a-z]{1,5} = [0-9]{1,4}", 0..8),
        ) {
            let engine = engine();
            let doc = open(&engine, &(lines.join("\n") + "\n"));
            for token in semantic_tokens(&doc) {
                prop_assert!(
                    (token.token_type as usize)
                        < carrion_analysis::features::semantic_tokens::TOKEN_TYPES.len()
                );
                prop_assert!(token.length > 0);
            }
        }
    }
}

mod concurrency {
    use super::*;

    #[test]
    fn refresh_never_exposes_empty_tables() {
        let catalog = Arc::new(CatalogLoader::new());
        let baseline = catalog.snapshot().builtins.len();
        assert!(baseline > 0);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let catalog = catalog.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        let snapshot = catalog.snapshot();
                        assert!(snapshot.builtins.len() >= baseline);
                        assert!(snapshot.classes.contains_key("String"));
                    }
                });
            }
            let writer = catalog.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    writer.refresh();
                }
            });
        });
    }

    #[test]
    fn per_uri_updates_read_their_own_writes() {
        let engine = engine();
        let uri = Url::parse("file:///seq.crl").unwrap();
        for n in 1..=20 {
            let text = format!("x = {n}\n");
            let (doc, _) = engine.store.update(uri.clone(), text.clone(), None);
            assert_eq!(doc.version, n);
            assert_eq!(engine.store.get(&uri).unwrap().text, text);
        }
    }
}
