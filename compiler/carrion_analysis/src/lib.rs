//! Semantic engine for the Carrion language server.
//!
//! The per-document pipeline: parse source into an AST, derive a symbol
//! table with inferred types, answer completions/hovers/navigation from
//! that table plus a runtime-derived catalog of builtins and grimoires,
//! and emit canonical formatting.
//!
//! Components, leaves first:
//!
//! - [`catalog`]: a live evaluator environment mirrored into immutable
//!   descriptor tables, refreshable and extensible by `ingest`
//! - [`packages`]: filesystem probe over the package search paths,
//!   feeding entry sources into the catalog
//! - [`symbols`]: AST → symbol table extraction with type inference
//! - [`store`]: the thread-safe URI → document map
//! - [`features`]: the request read paths (completion, hover, definition,
//!   document symbols, semantic tokens, formatting)

pub mod catalog;
mod descriptions;
pub mod features;
pub mod packages;
pub mod store;
pub mod symbols;

pub use catalog::{Catalog, CatalogLoader, IngestError};
pub use packages::{PackageProber, BUILTIN_MODULES, SOURCE_EXTENSION};
pub use store::{Document, DocumentStore, DIAGNOSTIC_SOURCE};
pub use symbols::SymbolTable;
