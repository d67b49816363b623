//! Core data model for the extraction pipeline.
//!
//! Everything here is request-local: a request fetches a document, analyses
//! it, and throws the intermediate structures away. The only shape that
//! outlives a request is [`ExtractionRecord`], the durable audit entry, whose
//! serde field names are part of the persisted record format and must not
//! change casually.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Layout analysis output ───────────────────────────────────────────────

/// A single text line as returned by the layout service.
///
/// Order within a page is preserved exactly as returned; the linearizer
/// depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    pub content: String,
}

/// One page of the analysed document, with its lines in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    /// 1-based page number.
    pub page_number: u32,
    pub lines: Vec<DocumentLine>,
}

/// A populated cell inside a [`DocumentTable`] grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    pub row_index: usize,
    pub column_index: usize,
    pub content: String,
}

/// A detected table: a `row_count` × `column_count` grid with a sparse cell
/// list. Any (row, col) pair not present in `cells` renders as an empty
/// string — the formatter never fails on sparse input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTable {
    pub row_count: usize,
    pub column_count: usize,
    pub cells: Vec<TableCell>,
}

/// A detected figure. The id is what the layout service keys rendered image
/// downloads by; figures without one cannot be resolved and are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFigure {
    pub id: Option<String>,
    pub caption: Option<String>,
    /// Page numbers of the figure's bounding regions, in service order.
    /// The first entry decides page association; absent means page 1.
    pub bounding_pages: Vec<u32>,
}

impl DocumentFigure {
    /// Page this figure is associated with (first bounding region, default 1).
    pub fn page_number(&self) -> u32 {
        self.bounding_pages.first().copied().unwrap_or(1)
    }
}

/// Identifies a completed analysis operation on the layout service, needed to
/// download rendered figure images afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisHandle {
    pub model_id: String,
    pub result_id: String,
}

/// Everything the layout extractor produces for one document.
///
/// `handle` is `None` for analyzers that cannot serve figure images (the
/// local text-extraction variant); such analyzers also never emit figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedDocument {
    pub handle: Option<AnalysisHandle>,
    pub pages: Vec<DocumentPage>,
    pub tables: Vec<DocumentTable>,
    pub figures: Vec<DocumentFigure>,
}

impl AnalyzedDocument {
    /// An empty result: zero pages is a valid, linearizable outcome, not an
    /// error. Downstream stages tolerate it.
    pub fn empty() -> Self {
        Self {
            handle: None,
            pages: Vec::new(),
            tables: Vec::new(),
            figures: Vec::new(),
        }
    }
}

// ── Figure resolution output ─────────────────────────────────────────────

/// A resolved figure: its caption text and the uploaded image's public URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFigure {
    pub caption: String,
    pub image_url: String,
}

/// Resolved figures grouped by page number, preserving discovery order
/// within a page. `BTreeMap` keeps page iteration deterministic.
pub type FigureMap = BTreeMap<u32, Vec<PageFigure>>;

// ── Storage types ────────────────────────────────────────────────────────

/// A document fetched from blob storage: raw bytes plus the public URL the
/// audit record references.
#[derive(Debug, Clone)]
pub struct FetchedBlob {
    pub bytes: Vec<u8>,
    pub url: String,
}

// ── Completion request types ─────────────────────────────────────────────

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// A complete completion request: ordered messages plus sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

// ── Audit trail ──────────────────────────────────────────────────────────

/// Terminal status of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    Failure,
}

/// Durable audit entry for one pipeline invocation. Immutable once written;
/// every invocation gets a fresh id regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub id: String,
    pub document_name: String,
    pub status: ExtractionStatus,
    /// Success note or failure detail (stage, error text, raw completion).
    pub message: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    /// Snapshot of the linearized document text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_content: Option<String>,
    /// Parsed structured output, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_content: Option<serde_json::Value>,
}

/// What a successful pipeline invocation hands back to the HTTP boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub record_id: String,
    pub document_name: String,
    pub document_url: String,
    pub analyzed_content: String,
    pub content: serde_json::Value,
}
