//! Pipeline orchestration: fetch, analyse, linearize, prompt, parse, audit.
//!
//! [`extract`] drives the stages in order and always writes exactly one
//! audit record, success or failure, before returning. Stage errors short-
//! circuit via `?` inside [`run_stages`]; the wrapper keeps a [`StageTrace`]
//! of what had been produced so far so failure records still carry the
//! document URL, the linearized text, and (for parse failures) the raw
//! completion.

use crate::clients::audit::{record_best_effort, AuditStore};
use crate::clients::completion::CompletionClient;
use crate::clients::layout::DocumentAnalyzer;
use crate::clients::storage::BlobStore;
use crate::config::ExtractionConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::model::{ExtractionOutcome, ExtractionRecord, ExtractionStatus};
use crate::pipeline::{figures, linearize, parse, prompt, tables};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The pipeline's external collaborators, shared across requests.
pub struct Clients {
    pub store: Arc<dyn BlobStore>,
    pub analyzer: Arc<dyn DocumentAnalyzer>,
    pub completion: Arc<dyn CompletionClient>,
    pub audit: Arc<dyn AuditStore>,
}

/// Intermediate artifacts captured for the audit record, filled in as the
/// stages progress.
#[derive(Default)]
struct StageTrace {
    document_url: Option<String>,
    analyzed_content: Option<String>,
}

/// Run the full extraction pipeline for one document.
///
/// Exactly one [`ExtractionRecord`] is written per call, on both paths. Audit
/// writes are best-effort: a failed write is logged and never changes the
/// returned result.
pub async fn extract(
    document_name: &str,
    clients: &Clients,
    config: &ExtractionConfig,
) -> ExtractResult<ExtractionOutcome> {
    let started = Instant::now();
    let record_id = uuid::Uuid::new_v4().to_string();
    let mut trace = StageTrace::default();

    let result = run_stages(document_name, clients, config, &mut trace).await;

    let record = match &result {
        Ok(content) => {
            info!(
                "Document '{document_name}' processed in {:.2}s",
                started.elapsed().as_secs_f64()
            );
            ExtractionRecord {
                id: record_id.clone(),
                document_name: document_name.to_string(),
                status: ExtractionStatus::Success,
                message: json!({"content": "Document processed successfully"}),
                timestamp: Utc::now(),
                document_url: trace.document_url.clone(),
                analyzed_content: trace.analyzed_content.clone(),
                response_content: Some(content.clone()),
            }
        }
        Err(e) => {
            error!(
                "Document '{document_name}' failed at stage '{}' after {:.2}s: {e}",
                e.stage(),
                started.elapsed().as_secs_f64()
            );
            let mut message = json!({"stage": e.stage(), "error": e.to_string()});
            if let ExtractError::Parse { raw, .. } = e {
                message["raw_completion"] = json!(raw);
            }
            ExtractionRecord {
                id: record_id.clone(),
                document_name: document_name.to_string(),
                status: ExtractionStatus::Failure,
                message,
                timestamp: Utc::now(),
                document_url: trace.document_url.clone(),
                analyzed_content: trace.analyzed_content.clone(),
                response_content: None,
            }
        }
    };
    record_best_effort(clients.audit.as_ref(), &record).await;

    let content = result?;
    Ok(ExtractionOutcome {
        record_id,
        document_name: document_name.to_string(),
        document_url: trace.document_url.unwrap_or_default(),
        analyzed_content: trace.analyzed_content.unwrap_or_default(),
        content,
    })
}

async fn run_stages(
    document_name: &str,
    clients: &Clients,
    config: &ExtractionConfig,
    trace: &mut StageTrace,
) -> ExtractResult<serde_json::Value> {
    // ── Step 1: fetch the document ───────────────────────────────────────
    let blob = clients
        .store
        .fetch(&config.documents_container, document_name)
        .await?;
    trace.document_url = Some(blob.url.clone());
    info!("Fetched '{document_name}' ({} bytes)", blob.bytes.len());

    // ── Step 2: layout analysis ──────────────────────────────────────────
    let analyzed = clients.analyzer.analyze(document_name, &blob.bytes).await?;
    info!(
        "Analysis returned {} pages, {} tables, {} figures",
        analyzed.pages.len(),
        analyzed.tables.len(),
        analyzed.figures.len()
    );

    // ── Step 3: render tables ────────────────────────────────────────────
    let table_text = tables::format_tables(&analyzed.tables);

    // ── Step 4: resolve figures to uploaded image URLs ───────────────────
    let figure_map = figures::resolve_figures(
        clients.analyzer.as_ref(),
        analyzed.handle.as_ref(),
        &analyzed.figures,
        clients.store.as_ref(),
        &config.images_container,
        document_name,
    )
    .await?;

    // ── Step 5: linearize pages with splices ─────────────────────────────
    let linearized = linearize::linearize(
        &analyzed.pages,
        &table_text,
        &figure_map,
        &config.table_trigger,
    );
    trace.analyzed_content = Some(linearized.clone());

    // ── Step 6: build the few-shot prompt ────────────────────────────────
    let request = prompt::build_request(&linearized, config, document_name);

    // ── Step 7: completion ───────────────────────────────────────────────
    let raw = clients.completion.complete(&request).await?;

    // ── Step 8: strict JSON parse ────────────────────────────────────────
    parse::parse_completion(&raw)
}
