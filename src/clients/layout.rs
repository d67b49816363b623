//! Layout analysis via Azure Document Intelligence.
//!
//! [`DocumentAnalyzer`] is the single polymorphic capability the pipeline
//! sees; the deployment picks one of two variants by configuration:
//!
//! * [`LayoutServiceAnalyzer`] (this module) — the remote layout service,
//!   which returns pages, tables, and figures with positional metadata.
//! * [`crate::clients::pdftext::PdfTextAnalyzer`] — a local text extractor
//!   for environments without the service; pages and lines only.
//!
//! The service API is asynchronous: `POST …:analyze` returns 202 with an
//! `Operation-Location` to poll. Polling past the configured deadline is an
//! [`ExtractError::AnalysisTimeout`] — never a silent empty result, because
//! an empty result is itself meaningful (a document with no detectable
//! pages) and must not be confused with "the service never answered".

use crate::error::{ExtractError, ExtractResult};
use crate::model::{
    AnalysisHandle, AnalyzedDocument, DocumentFigure, DocumentLine, DocumentPage, DocumentTable,
    TableCell,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Url;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const API_VERSION: &str = "2024-07-31-preview";
const LAYOUT_MODEL: &str = "prebuilt-layout";

/// Document layout analysis as the pipeline sees it.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Analyse raw document bytes into pages, tables, and figures.
    ///
    /// Zero detected pages is an empty success, not an error.
    async fn analyze(&self, document_name: &str, bytes: &[u8]) -> ExtractResult<AnalyzedDocument>;

    /// Fetch the rendered PNG for a figure detected by a prior [`analyze`]
    /// call identified by `handle`.
    ///
    /// [`analyze`]: DocumentAnalyzer::analyze
    async fn fetch_figure(
        &self,
        handle: &AnalysisHandle,
        figure_id: &str,
    ) -> ExtractResult<Vec<u8>>;
}

// ── Remote layout service ────────────────────────────────────────────────

/// [`DocumentAnalyzer`] backed by the Azure Document Intelligence REST API.
pub struct LayoutServiceAnalyzer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl LayoutServiceAnalyzer {
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        poll_interval_ms: u64,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            // Individual submit/poll/figure requests are short; the overall
            // analysis deadline is poll_timeout, enforced between polls.
            client: crate::clients::http_client(Duration::from_secs(60)),
            endpoint,
            api_key: api_key.into(),
            poll_interval: Duration::from_millis(poll_interval_ms),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}documentintelligence/documentModels/{LAYOUT_MODEL}:analyze?api-version={API_VERSION}&output=figures",
            ensure_trailing_slash(&self.endpoint)
        )
    }

    fn figure_url(&self, handle: &AnalysisHandle, figure_id: &str) -> String {
        format!(
            "{}documentintelligence/documentModels/{}/analyzeResults/{}/figures/{}?api-version={API_VERSION}",
            ensure_trailing_slash(&self.endpoint),
            handle.model_id,
            handle.result_id,
            figure_id
        )
    }

    /// Submit the document; returns the operation URL to poll.
    async fn begin_analyze(&self, bytes: &[u8]) -> ExtractResult<String> {
        let body = serde_json::json!({ "base64Source": BASE64.encode(bytes) });
        let response = self
            .client
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Analysis {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::Analysis {
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ExtractError::Analysis {
                reason: "analyze response missing Operation-Location header".into(),
            })
    }

    /// Poll the operation until it succeeds, fails, or times out.
    async fn poll_result(&self, operation_url: &str) -> ExtractResult<WireAnalyzeResult> {
        let started = Instant::now();
        loop {
            if started.elapsed() > self.poll_timeout {
                return Err(ExtractError::AnalysisTimeout {
                    secs: self.poll_timeout.as_secs(),
                });
            }

            let response = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .send()
                .await
                .map_err(|e| ExtractError::Analysis {
                    reason: e.to_string(),
                })?;

            if !response.status().is_success() {
                return Err(ExtractError::Analysis {
                    reason: format!("HTTP {} while polling analysis", response.status()),
                });
            }

            let operation: WireOperation =
                response.json().await.map_err(|e| ExtractError::Analysis {
                    reason: format!("malformed analysis status body: {e}"),
                })?;

            match operation.status.as_str() {
                "succeeded" => {
                    return operation.analyze_result.ok_or_else(|| ExtractError::Analysis {
                        reason: "succeeded operation carried no analyzeResult".into(),
                    })
                }
                "failed" => {
                    let reason = operation
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| "analysis failed without detail".into());
                    return Err(ExtractError::Analysis { reason });
                }
                other => {
                    debug!("Analysis status: {other}, polling again");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for LayoutServiceAnalyzer {
    async fn analyze(&self, document_name: &str, bytes: &[u8]) -> ExtractResult<AnalyzedDocument> {
        info!("Submitting '{}' ({} bytes) for layout analysis", document_name, bytes.len());
        let operation_url = self.begin_analyze(bytes).await?;
        let result_id = result_id_from_operation_url(&operation_url)?;
        let wire = self.poll_result(&operation_url).await?;

        let analyzed = AnalyzedDocument {
            handle: Some(AnalysisHandle {
                model_id: wire.model_id.unwrap_or_else(|| LAYOUT_MODEL.to_string()),
                result_id,
            }),
            pages: wire.pages.into_iter().map(Into::into).collect(),
            tables: wire.tables.into_iter().map(Into::into).collect(),
            figures: wire.figures.into_iter().map(Into::into).collect(),
        };
        info!(
            "Analysis of '{}' complete: {} pages, {} tables, {} figures",
            document_name,
            analyzed.pages.len(),
            analyzed.tables.len(),
            analyzed.figures.len()
        );
        Ok(analyzed)
    }

    async fn fetch_figure(
        &self,
        handle: &AnalysisHandle,
        figure_id: &str,
    ) -> ExtractResult<Vec<u8>> {
        let response = self
            .client
            .get(self.figure_url(handle, figure_id))
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| ExtractError::FigureFetch {
                figure_id: figure_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ExtractError::FigureFetch {
                figure_id: figure_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExtractError::FigureFetch {
                figure_id: figure_id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}

fn ensure_trailing_slash(url: &Url) -> String {
    let s = url.as_str();
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}

/// The result id is the last path segment of the Operation-Location URL
/// (`…/analyzeResults/{resultId}?api-version=…`).
fn result_id_from_operation_url(operation_url: &str) -> ExtractResult<String> {
    Url::parse(operation_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ExtractError::Analysis {
            reason: format!("cannot derive result id from operation URL '{operation_url}'"),
        })
}

// ── Wire types ───────────────────────────────────────────────────────────
//
// Private mirror of the service's JSON, converted into the crate model at
// the module boundary so nothing downstream depends on the wire casing.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOperation {
    status: String,
    analyze_result: Option<WireAnalyzeResult>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalyzeResult {
    model_id: Option<String>,
    #[serde(default)]
    pages: Vec<WirePage>,
    #[serde(default)]
    tables: Vec<WireTable>,
    #[serde(default)]
    figures: Vec<WireFigure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePage {
    page_number: u32,
    #[serde(default)]
    lines: Vec<WireLine>,
}

#[derive(Debug, Deserialize)]
struct WireLine {
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTable {
    row_count: usize,
    column_count: usize,
    #[serde(default)]
    cells: Vec<WireCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCell {
    row_index: usize,
    column_index: usize,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFigure {
    id: Option<String>,
    caption: Option<WireCaption>,
    #[serde(default)]
    bounding_regions: Vec<WireBoundingRegion>,
}

#[derive(Debug, Deserialize)]
struct WireCaption {
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBoundingRegion {
    page_number: u32,
}

impl From<WirePage> for DocumentPage {
    fn from(p: WirePage) -> Self {
        DocumentPage {
            page_number: p.page_number,
            lines: p
                .lines
                .into_iter()
                .map(|l| DocumentLine { content: l.content })
                .collect(),
        }
    }
}

impl From<WireTable> for DocumentTable {
    fn from(t: WireTable) -> Self {
        DocumentTable {
            row_count: t.row_count,
            column_count: t.column_count,
            cells: t
                .cells
                .into_iter()
                .map(|c| TableCell {
                    row_index: c.row_index,
                    column_index: c.column_index,
                    content: c.content,
                })
                .collect(),
        }
    }
}

impl From<WireFigure> for DocumentFigure {
    fn from(f: WireFigure) -> Self {
        DocumentFigure {
            id: f.id,
            caption: f.caption.map(|c| c.content),
            bounding_pages: f.bounding_regions.into_iter().map(|r| r.page_number).collect(),
        }
    }
}
