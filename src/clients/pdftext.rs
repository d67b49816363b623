//! Local text-extraction analyzer: the no-service variant of
//! [`DocumentAnalyzer`].
//!
//! Uses `pdf-extract` to pull per-page text straight out of the PDF, so
//! deployments without a layout-analysis service can still run the pipeline.
//! The trade-off is structural: no tables and no figures are detected, so
//! table splicing and image references simply never fire. Pages and line
//! order are preserved, which is all the linearizer strictly needs.

use crate::clients::layout::DocumentAnalyzer;
use crate::error::{ExtractError, ExtractResult};
use crate::model::{AnalysisHandle, AnalyzedDocument, DocumentLine, DocumentPage};
use async_trait::async_trait;
use tracing::info;

/// [`DocumentAnalyzer`] backed by local `pdf-extract` text extraction.
#[derive(Debug, Default)]
pub struct PdfTextAnalyzer;

impl PdfTextAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentAnalyzer for PdfTextAnalyzer {
    async fn analyze(&self, document_name: &str, bytes: &[u8]) -> ExtractResult<AnalyzedDocument> {
        let owned = bytes.to_vec();
        // PDF parsing is CPU-bound; keep it off the async executor.
        let pages_text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&owned)
        })
        .await
        .map_err(|e| ExtractError::Internal(format!("text extraction task failed: {e}")))?
        .map_err(|e| ExtractError::Analysis {
            reason: format!("pdf text extraction failed: {e}"),
        })?;

        let pages: Vec<DocumentPage> = pages_text
            .into_iter()
            .enumerate()
            .map(|(idx, text)| DocumentPage {
                page_number: idx as u32 + 1,
                lines: split_lines(&text),
            })
            .collect();

        info!(
            "Text extraction of '{}' complete: {} pages (no tables/figures in this mode)",
            document_name,
            pages.len()
        );

        Ok(AnalyzedDocument {
            handle: None,
            pages,
            tables: Vec::new(),
            figures: Vec::new(),
        })
    }

    async fn fetch_figure(
        &self,
        _handle: &AnalysisHandle,
        figure_id: &str,
    ) -> ExtractResult<Vec<u8>> {
        // This analyzer never emits figures, so the resolver never gets here.
        Err(ExtractError::Internal(format!(
            "text analyzer cannot serve figure '{figure_id}'"
        )))
    }
}

/// Split extracted page text into non-empty trimmed lines.
fn split_lines(text: &str) -> Vec<DocumentLine> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(|l| DocumentLine {
            content: l.to_string(),
        })
        .collect()
}
