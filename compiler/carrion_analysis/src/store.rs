//! Document store: the thread-safe URI → document map.
//!
//! Each update replaces the whole record (new `Arc<Document>`, version
//! bumped); feature providers hold the snapshot they fetched, so a
//! concurrent update never mutates under a reader. Import auto-loading
//! runs after the map write completes, so the prober can take the
//! catalog's write path without any store guard held.

use crate::catalog::CatalogLoader;
use crate::packages::PackageProber;
use crate::symbols::{self, SymbolTable};
use carrion_ir::ast::Program;
use carrion_ir::{LineIndex, Token};
use carrion_parse::ParseError;
use dashmap::DashMap;
use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};
use std::sync::Arc;

/// Diagnostic source tag on published parse errors.
pub const DIAGNOSTIC_SOURCE: &str = "carrion-lsp";

/// The in-memory record of one open document.
#[derive(Clone, Debug)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub version: i32,
    pub ast: Program,
    pub tokens: Vec<Token>,
    pub symbols: SymbolTable,
    pub line_index: LineIndex,
}

pub struct DocumentStore {
    documents: DashMap<Url, Arc<Document>>,
    catalog: Arc<CatalogLoader>,
    prober: Arc<PackageProber>,
}

impl DocumentStore {
    pub fn new(catalog: Arc<CatalogLoader>, prober: Arc<PackageProber>) -> Self {
        DocumentStore {
            documents: DashMap::new(),
            catalog,
            prober,
        }
    }

    /// Parse, tokenize, and analyze `text`, replacing any previous record
    /// for `uri`. Returns the new record and the parse diagnostics (the
    /// document is stored even when they are nonempty; symbols reflect
    /// whatever the parser recovered).
    pub fn update(
        &self,
        uri: Url,
        text: String,
        preparsed: Option<(Program, Vec<ParseError>)>,
    ) -> (Arc<Document>, Vec<Diagnostic>) {
        let tokens = carrion_lexer::lex(&text);
        let (ast, errors) =
            preparsed.unwrap_or_else(|| carrion_parse::parse_tokens(tokens.clone()));
        let line_index = LineIndex::new(&text);
        let symbols = symbols::extract(&ast, &line_index, &self.catalog.snapshot());

        let diagnostics = errors
            .iter()
            .map(|err| parse_error_diagnostic(err, &line_index))
            .collect();

        let version = self
            .documents
            .get(&uri)
            .map(|doc| doc.version + 1)
            .unwrap_or(1);

        let document = Arc::new(Document {
            uri: uri.clone(),
            text,
            version,
            ast,
            tokens,
            symbols,
            line_index,
        });
        self.documents.insert(uri, document.clone());

        // After the map write: package ingestion may take the catalog
        // write lock, which must never nest inside a store guard.
        self.prober.auto_load_imports(&document.symbols);

        (document, diagnostics)
    }

    pub fn remove(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|entry| entry.value().clone())
    }

    pub fn catalog(&self) -> &CatalogLoader {
        &self.catalog
    }
}

fn parse_error_diagnostic(error: &ParseError, line_index: &LineIndex) -> Diagnostic {
    let (start, end) = line_index.range(error.span);
    Diagnostic {
        range: Range {
            start: Position::new(start.line, start.character),
            end: Position::new(end.line, end.character),
        },
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: error.message.clone(),
        ..Default::default()
    }
}
