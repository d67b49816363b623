//! End-to-end pipeline tests against in-memory collaborators.
//!
//! A fixture analyzer stands in for the layout service, producing a small
//! document with a table (preceded by its trigger sentence), a captioned
//! figure, and plain text, so the tests can assert on the exact linearized
//! text, the audit trail, and the HTTP status mapping without any network.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use regdoc_extract::clients::{
    DocumentAnalyzer, MemoryAuditStore, MemoryBlobStore, ScriptedCompletion,
};
use regdoc_extract::{
    extract, router, AppState, Clients, ExtractError, ExtractResult, ExtractionConfig,
    ExtractionStatus, DEFAULT_TABLE_TRIGGER,
};
use regdoc_extract::model::{
    AnalysisHandle, AnalyzedDocument, DocumentFigure, DocumentLine, DocumentPage, DocumentTable,
    TableCell,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

// ── Fixtures ─────────────────────────────────────────────────────────────

struct FixtureAnalyzer {
    document: AnalyzedDocument,
    figure_images: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl DocumentAnalyzer for FixtureAnalyzer {
    async fn analyze(&self, _: &str, _: &[u8]) -> ExtractResult<AnalyzedDocument> {
        Ok(self.document.clone())
    }

    async fn fetch_figure(&self, _: &AnalysisHandle, figure_id: &str) -> ExtractResult<Vec<u8>> {
        self.figure_images
            .get(figure_id)
            .cloned()
            .ok_or_else(|| ExtractError::FigureFetch {
                figure_id: figure_id.to_string(),
                reason: "HTTP 404".into(),
            })
    }
}

fn page(n: u32, lines: &[&str]) -> DocumentPage {
    DocumentPage {
        page_number: n,
        lines: lines
            .iter()
            .map(|l| DocumentLine {
                content: l.to_string(),
            })
            .collect(),
    }
}

/// Two pages: page 1 carries a table and its trigger sentence, page 2 a
/// captioned figure.
fn fixture_document() -> AnalyzedDocument {
    AnalyzedDocument {
        handle: Some(AnalysisHandle {
            model_id: "prebuilt-layout".into(),
            result_id: "op-42".into(),
        }),
        pages: vec![
            page(
                1,
                &[
                    "DATA REQUEST QUESTIONS",
                    "10.1 Please review the consumption data below.",
                    DEFAULT_TABLE_TRIGGER,
                ],
            ),
            page(
                2,
                &[
                    "10.2 Please provide reasons for the variation in the below graph:",
                    "Annual Energy Consumption Increase by Countries (Last 5 Years)",
                    "End of request.",
                ],
            ),
        ],
        tables: vec![DocumentTable {
            row_count: 2,
            column_count: 2,
            cells: vec![
                cell(0, 0, "Country"),
                cell(0, 1, "Energy Consumption Increase (%)"),
                cell(1, 0, "USA"),
                cell(1, 1, "15"),
            ],
        }],
        figures: vec![DocumentFigure {
            id: Some("3.1".into()),
            caption: Some(
                "Annual Energy Consumption Increase by Countries (Last 5 Years)".into(),
            ),
            bounding_pages: vec![2],
        }],
    }
}

fn cell(row: usize, col: usize, content: &str) -> TableCell {
    TableCell {
        row_index: row,
        column_index: col,
        content: content.to_string(),
    }
}

struct Harness {
    clients: Clients,
    store: Arc<MemoryBlobStore>,
    audit: Arc<MemoryAuditStore>,
    completion: Arc<ScriptedCompletion>,
}

fn harness(reply: &str) -> Harness {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("documents", "Intervenor2_Data Request Template.pdf", b"%PDF-1.7".to_vec());
    let audit = Arc::new(MemoryAuditStore::new());
    let completion = Arc::new(ScriptedCompletion::new(reply));
    let clients = Clients {
        store: store.clone(),
        analyzer: Arc::new(FixtureAnalyzer {
            document: fixture_document(),
            figure_images: [("3.1".to_string(), b"\x89PNG".to_vec())].into(),
        }),
        completion: completion.clone(),
        audit: audit.clone(),
    };
    Harness {
        clients,
        store,
        audit,
        completion,
    }
}

fn app(h: &Harness) -> axum::Router {
    router(AppState {
        clients: Arc::new(Clients {
            store: h.clients.store.clone(),
            analyzer: h.clients.analyzer.clone(),
            completion: h.clients.completion.clone(),
            audit: h.clients.audit.clone(),
        }),
        config: Arc::new(ExtractionConfig::default()),
    })
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── Full pipeline ────────────────────────────────────────────────────────

#[tokio::test]
async fn table_block_lands_immediately_before_trigger_sentence() {
    let h = harness(r#"{"data": []}"#);
    let config = ExtractionConfig::default();

    let outcome = extract("Intervenor2_Data Request Template.pdf", &h.clients, &config)
        .await
        .unwrap();

    let text = &outcome.analyzed_content;
    let table_at = text.find("Table #1").expect("table block present");
    let trigger_at = text.find(DEFAULT_TABLE_TRIGGER).unwrap();
    assert!(table_at < trigger_at);
    assert!(text.contains("| Country | Energy Consumption Increase (%) |"));
    assert!(text.contains("|---|---|"));
    // The trigger sentence is kept and the block appears exactly once.
    assert_eq!(text.matches("Table #1").count(), 1);
}

#[tokio::test]
async fn caption_line_is_followed_by_uploaded_image_url() {
    let h = harness(r#"{"data": []}"#);
    let config = ExtractionConfig::default();

    let outcome = extract("Intervenor2_Data Request Template.pdf", &h.clients, &config)
        .await
        .unwrap();

    // The image was uploaded under {document}_{figure_id}.png.
    assert_eq!(
        h.store.names_in("images"),
        vec!["Intervenor2_Data Request Template.pdf_3.1.png"]
    );
    // The caption line gains an Image URL line, with spaces percent-encoded.
    assert!(outcome.analyzed_content.contains(
        "Annual Energy Consumption Increase by Countries (Last 5 Years)\n\
         Image URL: https://blobs.test/images/Intervenor2_Data%20Request%20Template.pdf_3.1.png\n"
    ));
}

#[tokio::test]
async fn prompt_carries_linearized_text_as_final_message() {
    let h = harness(r#"{"data": []}"#);
    let config = ExtractionConfig::default();

    let outcome = extract("Intervenor2_Data Request Template.pdf", &h.clients, &config)
        .await
        .unwrap();

    let requests = h.completion.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.messages.len(), 6);
    assert_eq!(
        request.messages.last().unwrap().content,
        outcome.analyzed_content
    );
    assert_eq!(request.temperature, 0.1);
    assert_eq!(request.max_tokens, 11_576);
}

#[tokio::test]
async fn fenced_completion_is_unwrapped_and_audited_as_success() {
    let h = harness("```json\n{\"data\": [{\"questions\": []}]}\n```");
    let config = ExtractionConfig::default();

    let outcome = extract("Intervenor2_Data Request Template.pdf", &h.clients, &config)
        .await
        .unwrap();
    assert_eq!(outcome.content, serde_json::json!({"data": [{"questions": []}]}));

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, ExtractionStatus::Success);
    assert_eq!(
        entries[0].message,
        serde_json::json!({"content": "Document processed successfully"})
    );
    assert_eq!(
        entries[0].response_content,
        Some(serde_json::json!({"data": [{"questions": []}]}))
    );
    assert_eq!(entries[0].analyzed_content.as_deref(), Some(outcome.analyzed_content.as_str()));
}

// ── HTTP boundary ────────────────────────────────────────────────────────

#[tokio::test]
async fn get_without_documentname_is_400_and_touches_no_storage() {
    let h = harness("{}");
    let response = app(&h)
        .oneshot(
            Request::get("/regulatorydocumentprocessing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Audited, but no fetch was attempted.
    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, ExtractionStatus::Failure);
    assert!(h.store.fetched().is_empty());
}

#[tokio::test]
async fn get_unknown_document_is_404() {
    let h = harness("{}");
    let response = app(&h)
        .oneshot(
            Request::get("/regulatorydocumentprocessing?documentname=ghost.pdf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_success_returns_parsed_completion() {
    let h = harness(r#"{"data": [{"questions": [{"mainquestion": "10.1"}]}]}"#);
    let response = app(&h)
        .oneshot(
            Request::get(
                "/regulatorydocumentprocessing?documentname=Intervenor2_Data%20Request%20Template.pdf",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["data"][0]["questions"][0]["mainquestion"], "10.1");
}

#[tokio::test]
async fn non_json_completion_is_500_with_failure_audit() {
    let h = harness("I'm sorry, I cannot process this document.");
    let response = app(&h)
        .oneshot(
            Request::get(
                "/regulatorydocumentprocessing?documentname=Intervenor2_Data%20Request%20Template.pdf",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_string(response).await,
        "Error occurred while processing the document. Please check the logs for more details."
    );

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, ExtractionStatus::Failure);
    assert_eq!(entries[0].message["stage"], "parse");
    assert_eq!(
        entries[0].message["raw_completion"],
        "I'm sorry, I cannot process this document."
    );
}
