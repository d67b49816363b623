//! HTTP boundary: one GET endpoint that triggers an extraction.
//!
//! Status mapping is deliberate and narrow: a missing or empty
//! `documentname` query parameter is the caller's fault (400) and is audited
//! without touching any downstream service; an unknown document is 404; any
//! other pipeline failure is a 500 with a generic body, details staying in
//! logs and the audit trail only.

use crate::clients::audit::record_best_effort;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extract::{extract, Clients};
use crate::model::{ExtractionRecord, ExtractionStatus};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const INTERNAL_ERROR_BODY: &str =
    "Error occurred while processing the document. Please check the logs for more details.";

/// Shared application state: clients and config, both process-wide.
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<Clients>,
    pub config: Arc<ExtractionConfig>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/regulatorydocumentprocessing", get(process_document))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct ProcessQuery {
    documentname: Option<String>,
}

async fn process_document(
    State(state): State<AppState>,
    Query(query): Query<ProcessQuery>,
) -> Response {
    let document_name = match query.documentname.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            // Audited like any other invocation, but no downstream calls.
            let record = ExtractionRecord {
                id: uuid::Uuid::new_v4().to_string(),
                document_name: String::new(),
                status: ExtractionStatus::Failure,
                message: json!({
                    "stage": "request",
                    "error": "missing required query parameter 'documentname'",
                }),
                timestamp: Utc::now(),
                document_url: None,
                analyzed_content: None,
                response_content: None,
            };
            record_best_effort(state.clients.audit.as_ref(), &record).await;
            return (
                StatusCode::BAD_REQUEST,
                "Missing required query parameter 'documentname'.",
            )
                .into_response();
        }
    };

    info!("Processing document '{document_name}'");
    match extract(&document_name, &state.clients, &state.config).await {
        Ok(outcome) => Json(outcome.content).into_response(),
        Err(ExtractError::DocumentNotFound { container, name }) => {
            info!("Document '{name}' not found in container '{container}'");
            (
                StatusCode::NOT_FOUND,
                format!("Document '{name}' not found."),
            )
                .into_response()
        }
        Err(e) => {
            error!("Processing '{document_name}' failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::audit::MemoryAuditStore;
    use crate::clients::completion::ScriptedCompletion;
    use crate::clients::layout::DocumentAnalyzer;
    use crate::clients::storage::MemoryBlobStore;
    use crate::error::ExtractResult;
    use crate::model::{AnalysisHandle, AnalyzedDocument};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct EmptyAnalyzer;

    #[async_trait]
    impl DocumentAnalyzer for EmptyAnalyzer {
        async fn analyze(&self, _: &str, _: &[u8]) -> ExtractResult<AnalyzedDocument> {
            Ok(AnalyzedDocument::empty())
        }

        async fn fetch_figure(&self, _: &AnalysisHandle, id: &str) -> ExtractResult<Vec<u8>> {
            Err(ExtractError::FigureFetch {
                figure_id: id.to_string(),
                reason: "unused".into(),
            })
        }
    }

    fn state(store: MemoryBlobStore, reply: &str) -> (AppState, Arc<MemoryAuditStore>) {
        let audit = Arc::new(MemoryAuditStore::new());
        let state = AppState {
            clients: Arc::new(Clients {
                store: Arc::new(store),
                analyzer: Arc::new(EmptyAnalyzer),
                completion: Arc::new(ScriptedCompletion::new(reply)),
                audit: audit.clone(),
            }),
            config: Arc::new(ExtractionConfig::default()),
        };
        (state, audit)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_parameter_is_400_and_audited_without_fetch() {
        let store = MemoryBlobStore::new();
        let (state, audit) = state(store, "{}");
        let app = router(state.clone());

        let response = app
            .oneshot(
                Request::get("/regulatorydocumentprocessing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, ExtractionStatus::Failure);
        assert_eq!(entries[0].message["stage"], "request");
    }

    #[tokio::test]
    async fn empty_parameter_is_also_400() {
        let (state, _) = state(MemoryBlobStore::new(), "{}");
        let response = router(state)
            .oneshot(
                Request::get("/regulatorydocumentprocessing?documentname=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_document_is_404() {
        let (state, _) = state(MemoryBlobStore::new(), "{}");
        let response = router(state)
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
    async fn success_returns_completion_json() {
        let store = MemoryBlobStore::new();
        store.insert("documents", "req.pdf", b"%PDF-1.7".to_vec());
        let (state, _) = state(store, r#"{"data": [{"questions": []}]}"#);

        let response = router(state)
            .oneshot(
                Request::get("/regulatorydocumentprocessing?documentname=req.pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, serde_json::json!({"data": [{"questions": []}]}));
    }

    #[tokio::test]
    async fn pipeline_failure_is_500_with_generic_body() {
        let store = MemoryBlobStore::new();
        store.insert("documents", "req.pdf", b"%PDF-1.7".to_vec());
        let (state, audit) = state(store, "this is not json");

        let response = router(state)
            .oneshot(
                Request::get("/regulatorydocumentprocessing?documentname=req.pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, INTERNAL_ERROR_BODY);

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message["raw_completion"], "this is not json");
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let (state, _) = state(MemoryBlobStore::new(), "{}");
        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
