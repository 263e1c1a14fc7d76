//! The `LanguageServer` implementation wiring the protocol to the
//! semantic engine.

use carrion_analysis::features::{
    completion, definition, document_symbols, formatting, hover, semantic_tokens,
};
use carrion_analysis::{CatalogLoader, DocumentStore, PackageProber};
use serde::Deserialize;
use std::sync::Arc;
use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

#[derive(Debug, Deserialize)]
pub struct LoadPackageParams {
    name: String,
}

pub struct CarrionLanguageServer {
    client: Client,
    catalog: Arc<CatalogLoader>,
    prober: Arc<PackageProber>,
    store: DocumentStore,
}

impl CarrionLanguageServer {
    pub fn new(client: Client) -> Self {
        let catalog = Arc::new(CatalogLoader::new());
        let prober = Arc::new(PackageProber::new(catalog.clone()));
        let store = DocumentStore::new(catalog.clone(), prober.clone());
        CarrionLanguageServer {
            client,
            catalog,
            prober,
            store,
        }
    }

    /// Only documents with the Carrion source extension are analyzed.
    fn is_carrion_uri(uri: &Url) -> bool {
        uri.path()
            .ends_with(&format!(".{}", carrion_analysis::SOURCE_EXTENSION))
    }

    /// Parse, store, and publish diagnostics for one document revision.
    async fn analyze(&self, uri: Url, text: String) {
        let (_doc, diagnostics) = self.store.update(uri.clone(), text, None);
        self.client
            .publish_diagnostics(uri, diagnostics, None)
            .await;
    }

    /// Custom `carrion/refreshCatalog` request: re-enumerate the
    /// interpreter environment.
    pub async fn refresh_catalog(&self) -> Result<()> {
        self.catalog.refresh();
        tracing::info!("catalog refreshed on client request");
        Ok(())
    }

    /// Custom `carrion/loadPackage` request: probe and ingest one package
    /// by name. Parse and evaluation failures surface as RPC errors.
    pub async fn load_package(&self, params: LoadPackageParams) -> Result<()> {
        self.prober.load(&params.name).map_err(|err| Error {
            code: ErrorCode::InternalError,
            message: err.to_string().into(),
            data: None,
        })
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for CarrionLanguageServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        ".".to_string(),
                        "(".to_string(),
                        " ".to_string(),
                    ]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            legend: SemanticTokensLegend {
                                token_types: semantic_tokens::TOKEN_TYPES
                                    .into_iter()
                                    .map(SemanticTokenType::new)
                                    .collect(),
                                token_modifiers: semantic_tokens::TOKEN_MODIFIERS
                                    .into_iter()
                                    .map(SemanticTokenModifier::new)
                                    .collect(),
                            },
                            full: Some(SemanticTokensFullOptions::Bool(true)),
                            ..Default::default()
                        },
                    ),
                ),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Carrion Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("Carrion LSP server initialized");
        self.client
            .log_message(MessageType::INFO, "Carrion language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        if !Self::is_carrion_uri(&uri) {
            return;
        }
        self.analyze(uri, params.text_document.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if !Self::is_carrion_uri(&uri) {
            return;
        }
        // Incremental changes are accepted but each one replaces the
        // whole document; full incremental application is a future
        // extension.
        for change in params.content_changes {
            self.analyze(uri.clone(), change.text).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if !Self::is_carrion_uri(&uri) {
            return;
        }
        if let Some(text) = params.text {
            self.analyze(uri, text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.store.remove(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let items = match self.store.get(&uri) {
            Some(doc) => completion::completion(&doc, &self.catalog.snapshot(), position),
            None => Vec::new(),
        };
        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self
            .store
            .get(&uri)
            .and_then(|doc| hover::hover(&doc, &self.catalog.snapshot(), position)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let locations = match self.store.get(&uri) {
            Some(doc) => definition::definition(&doc, position),
            None => Vec::new(),
        };
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, _params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        // Cross-file reference search is out of scope; the capability is
        // declared and answered with an empty list.
        Ok(Some(Vec::new()))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let symbols = match self.store.get(&params.text_document.uri) {
            Some(doc) => document_symbols::document_symbols(&doc),
            None => Vec::new(),
        };
        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let data = match self.store.get(&params.text_document.uri) {
            Some(doc) => semantic_tokens::semantic_tokens(&doc),
            None => Vec::new(),
        };
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data,
        })))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let edits = match self.store.get(&params.text_document.uri) {
            Some(doc) => formatting::formatting(&doc, &params.options),
            None => Vec::new(),
        };
        Ok(Some(edits))
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {
        // Accepted and ignored; the server has no client-configurable
        // settings in this release.
        tracing::debug!("workspace/didChangeConfiguration ignored");
    }
}
