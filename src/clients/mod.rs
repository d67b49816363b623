//! Clients for the pipeline's external collaborators.
//!
//! Each collaborator is a trait the pipeline depends on plus one production
//! implementation and (where tests need it) an in-memory one. Handles are
//! constructed once at process start and shared across requests; none of
//! them carries per-request mutable state.

use std::time::Duration;

pub mod audit;
pub mod completion;
pub mod layout;
pub mod pdftext;
pub mod storage;

pub use audit::{record_best_effort, AuditStore, CosmosAuditStore, MemoryAuditStore};
pub use completion::{AzureOpenAiClient, CompletionClient, ScriptedCompletion};
pub use layout::{DocumentAnalyzer, LayoutServiceAnalyzer};
pub use pdftext::PdfTextAnalyzer;
pub use storage::{AzureBlobStore, BlobStore, MemoryBlobStore};

/// HTTP client with a per-request timeout. Every remote client caps each
/// individual request this way so a hung connection cannot stall a stage
/// past its own deadline; stage-level deadlines (analysis polling) layer on
/// top of it.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("static reqwest client configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_builds_with_timeout() {
        // Would panic if the static builder configuration were invalid.
        let _ = http_client(Duration::from_secs(1));
    }
}
