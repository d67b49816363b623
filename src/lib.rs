//! # regdoc-extract
//!
//! Extraction pipeline for regulatory data-request documents: fetch a PDF
//! from blob storage, run layout analysis, render its tables and figures
//! into the text, and have a language model lift the (often wildly
//! non-uniform) question structure into strict JSON. Every invocation —
//! success or failure — leaves one audit record behind.
//!
//! ```text
//! blob storage ──► layout analysis ──► tables ──┐
//!                        │                      ├──► linearize ──► prompt
//!                        └────► figures ────────┘                    │
//!                                                                    ▼
//!  audit trail ◄── record ◄── parse (strict JSON) ◄───────── completion
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use regdoc_extract::{extract, Clients, ExtractionConfig};
//! use regdoc_extract::clients::{
//!     MemoryAuditStore, MemoryBlobStore, PdfTextAnalyzer, ScriptedCompletion,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), regdoc_extract::ExtractError> {
//! let store = MemoryBlobStore::new();
//! store.insert("documents", "request.pdf", std::fs::read("request.pdf").unwrap());
//!
//! let clients = Clients {
//!     store: Arc::new(store),
//!     analyzer: Arc::new(PdfTextAnalyzer::new()),
//!     completion: Arc::new(ScriptedCompletion::new(r#"{"data": []}"#)),
//!     audit: Arc::new(MemoryAuditStore::new()),
//! };
//! let config = ExtractionConfig::default();
//!
//! let outcome = extract("request.pdf", &clients, &config).await?;
//! println!("{}", outcome.content);
//! # Ok(())
//! # }
//! ```
//!
//! The [`server`] module exposes the same pipeline behind an HTTP GET
//! endpoint; the `regdoc-server` binary wires production clients from
//! environment variables.

pub mod clients;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod server;

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_TABLE_TRIGGER};
pub use error::{ExtractError, ExtractResult};
pub use extract::{extract, Clients};
pub use model::{
    AnalyzedDocument, CompletionRequest, DocumentFigure, DocumentPage, DocumentTable,
    ExtractionOutcome, ExtractionRecord, ExtractionStatus, FetchedBlob, FigureMap,
};
pub use server::{router, AppState};
