//! Completion service client.
//!
//! [`CompletionClient`] is the seam between the prompt builder and the model
//! backend. [`AzureOpenAiClient`] talks to an Azure OpenAI chat-completions
//! deployment; [`ScriptedCompletion`] replays canned replies for tests.
//!
//! Deliberately no retries here: a completion call is the most expensive
//! step of the pipeline, and a blind retry would double-bill. Transient
//! failures surface as [`ExtractError::Completion`] and the request fails.

use crate::error::{ExtractError, ExtractResult};
use crate::model::CompletionRequest;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::debug;

/// Language-model completion as the pipeline sees it: messages in, raw
/// completion text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> ExtractResult<String>;
}

// ── Azure OpenAI ─────────────────────────────────────────────────────────

/// Chat-completions client for one Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(endpoint: Url, api_key: impl Into<String>, deployment: impl Into<String>) -> Self {
        // A near-max_tokens completion over a dense document takes minutes.
        Self {
            client: crate::clients::http_client(std::time::Duration::from_secs(300)),
            endpoint,
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: "2024-02-15-preview".to_string(),
        }
    }

    fn completions_url(&self) -> String {
        let base = self.endpoint.as_str().trim_end_matches('/');
        format!(
            "{base}/openai/deployments/{}/chat/completions?api-version={}",
            self.deployment, self.api_version
        )
    }
}

#[derive(Debug, Deserialize)]
struct WireCompletion {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> ExtractResult<String> {
        let body = serde_json::json!({
            "messages": request.messages,
            "temperature": request.temperature,
            "top_p": request.top_p,
            "max_tokens": request.max_tokens,
        });

        debug!(
            "Requesting completion: {} messages, max_tokens={}",
            request.messages.len(),
            request.max_tokens
        );

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Completion {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::Completion {
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        let wire: WireCompletion = response.json().await.map_err(|e| ExtractError::Completion {
            reason: format!("malformed completion body: {e}"),
        })?;

        wire.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractError::Completion {
                reason: "no response choices returned".into(),
            })
    }
}

// ── Scripted fake ────────────────────────────────────────────────────────

/// [`CompletionClient`] that returns a fixed reply and logs every request,
/// for tests and offline runs.
pub struct ScriptedCompletion {
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> ExtractResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}
