//! Error types for the regdoc-extract library.
//!
//! One variant per pipeline stage that can fail, so the request boundary can
//! map an error back to the stage it came from: the audit record stores the
//! stage label from [`ExtractError::stage`], the logs get the full message,
//! and the HTTP caller only ever sees a generic 500 (except the two
//! caller-correctable cases, missing parameter and missing document).
//!
//! No automatic retries happen anywhere in the pipeline. Layout analysis and
//! completion calls are costly, and a blind retry could duplicate image
//! uploads or double-bill the model service. Failure is terminal per request;
//! the caller resubmits.

use thiserror::Error;

/// All errors returned by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The named document does not exist in the documents container.
    #[error("document '{name}' not found in container '{container}'")]
    DocumentNotFound { container: String, name: String },

    /// Storage was reachable but the fetch failed for another reason.
    #[error("failed to fetch '{name}' from storage: {reason}")]
    Fetch { name: String, reason: String },

    // ── Layout analysis errors ────────────────────────────────────────────
    /// The layout service reported an HTTP-level failure.
    #[error("layout analysis failed: {reason}")]
    Analysis { reason: String },

    /// The analysis operation never reached a terminal state.
    #[error("layout analysis did not complete within {secs}s")]
    AnalysisTimeout { secs: u64 },

    // ── Figure resolution errors ──────────────────────────────────────────
    /// Fetching a rendered figure image from the layout service failed.
    ///
    /// Propagated, never skipped: an unresolved figure would break caption
    /// matching silently during linearization.
    #[error("failed to fetch figure '{figure_id}': {reason}")]
    FigureFetch { figure_id: String, reason: String },

    /// Uploading a figure image to the images container failed.
    #[error("failed to upload '{blob_name}' to storage: {reason}")]
    Upload { blob_name: String, reason: String },

    // ── Completion errors ─────────────────────────────────────────────────
    /// The completion service returned a transport failure or non-2xx status.
    #[error("completion service error: {reason}")]
    Completion { reason: String },

    /// The completion text was empty after stripping code fences.
    #[error("completion returned no content")]
    EmptyCompletion,

    /// The completion text was not valid JSON.
    ///
    /// Carries the raw text so the audit record can capture what the model
    /// actually produced.
    #[error("completion output is not valid JSON: {reason}")]
    Parse { reason: String, raw: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// The pipeline stage this error belongs to, as recorded in the audit
    /// trail's failure message.
    pub fn stage(&self) -> &'static str {
        match self {
            ExtractError::DocumentNotFound { .. } | ExtractError::Fetch { .. } => "fetch",
            ExtractError::Analysis { .. } | ExtractError::AnalysisTimeout { .. } => "analysis",
            ExtractError::FigureFetch { .. } => "figure_fetch",
            ExtractError::Upload { .. } => "upload",
            ExtractError::Completion { .. } => "completion",
            ExtractError::EmptyCompletion | ExtractError::Parse { .. } => "parse",
            ExtractError::InvalidConfig(_) => "config",
            ExtractError::Internal(_) => "internal",
        }
    }
}

/// Result type alias used throughout the pipeline.
pub type ExtractResult<T> = Result<T, ExtractError>;
