//! Blob storage: fetch submitted documents, upload generated figure images.
//!
//! The pipeline only needs two operations, so [`BlobStore`] is the whole
//! contract. [`AzureBlobStore`] talks to Azure Blob Storage over REST;
//! [`MemoryBlobStore`] backs tests and local development with a `HashMap`.
//!
//! The client handle is long-lived and carries no per-request state, so a
//! single instance is shared across concurrent requests behind an `Arc`.

use crate::error::{ExtractError, ExtractResult};
use crate::model::FetchedBlob;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Object storage as the pipeline sees it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob's bytes and its public URL.
    ///
    /// A missing blob is [`ExtractError::DocumentNotFound`] so the HTTP
    /// boundary can answer 404 precisely; every other failure is
    /// [`ExtractError::Fetch`].
    async fn fetch(&self, container: &str, name: &str) -> ExtractResult<FetchedBlob>;

    /// Upload bytes, overwriting any existing blob of the same name, and
    /// return the resulting public URL. Overwrite is deliberate: re-runs of
    /// the same document must not accumulate stale figure images.
    async fn upload(
        &self,
        container: &str,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> ExtractResult<String>;
}

// ── Azure Blob Storage ───────────────────────────────────────────────────

/// Azure Blob Storage over its REST interface.
pub struct AzureBlobStore {
    client: reqwest::Client,
    account_url: Url,
    /// SAS token (without the leading '?') appended to every request.
    /// `None` works only against containers with anonymous access.
    sas_token: Option<String>,
}

impl AzureBlobStore {
    pub fn new(account_url: Url, sas_token: Option<String>) -> Self {
        // Generous cap: submitted PDFs can run to tens of megabytes.
        Self {
            client: crate::clients::http_client(std::time::Duration::from_secs(120)),
            account_url,
            sas_token,
        }
    }

    /// Public URL for a blob; path segments are percent-encoded, which is
    /// exactly how the URL appears in audit records and image references.
    fn blob_url(&self, container: &str, name: &str) -> ExtractResult<Url> {
        let mut url = self.account_url.clone();
        url.path_segments_mut()
            .map_err(|_| ExtractError::Internal("storage account URL cannot be a base".into()))?
            .pop_if_empty()
            .push(container)
            .push(name);
        Ok(url)
    }

    fn with_sas(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(ref sas) = self.sas_token {
            url.set_query(Some(sas));
        }
        url
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn fetch(&self, container: &str, name: &str) -> ExtractResult<FetchedBlob> {
        let public_url = self.blob_url(container, name)?;
        let response = self
            .client
            .get(self.with_sas(&public_url))
            .send()
            .await
            .map_err(|e| ExtractError::Fetch {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ExtractError::DocumentNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ExtractError::Fetch {
                name: name.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ExtractError::Fetch {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        info!("Fetched '{}' ({} bytes) from '{}'", name, bytes.len(), container);
        Ok(FetchedBlob {
            bytes: bytes.to_vec(),
            url: public_url.to_string(),
        })
    }

    async fn upload(
        &self,
        container: &str,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> ExtractResult<String> {
        let public_url = self.blob_url(container, name)?;
        let response = self
            .client
            .put(self.with_sas(&public_url))
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", "2021-08-06")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| ExtractError::Upload {
                blob_name: name.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ExtractError::Upload {
                blob_name: name.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        debug!("Uploaded '{}' ({} bytes) to '{}'", name, bytes.len(), container);
        Ok(public_url.to_string())
    }
}

// ── In-memory store ──────────────────────────────────────────────────────

/// In-memory [`BlobStore`] for tests and local development.
///
/// Tracks fetches and uploads so tests can assert which downstream calls
/// were (or were not) attempted.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(String, String), Vec<u8>>>,
    fetch_log: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob before running the pipeline.
    pub fn insert(&self, container: &str, name: &str, bytes: Vec<u8>) {
        self.blobs
            .lock()
            .unwrap()
            .insert((container.to_string(), name.to_string()), bytes);
    }

    /// Names fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetch_log.lock().unwrap().clone()
    }

    /// Blob names currently present in a container.
    pub fn names_in(&self, container: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .blobs
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, n)| n.clone())
            .collect();
        names.sort();
        names
    }

    fn url_for(container: &str, name: &str) -> String {
        // Mirrors the percent-encoding real storage URLs carry.
        let encoded = name.replace(' ', "%20");
        format!("https://blobs.test/{container}/{encoded}")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn fetch(&self, container: &str, name: &str) -> ExtractResult<FetchedBlob> {
        self.fetch_log.lock().unwrap().push(name.to_string());
        let blobs = self.blobs.lock().unwrap();
        match blobs.get(&(container.to_string(), name.to_string())) {
            Some(bytes) => Ok(FetchedBlob {
                bytes: bytes.clone(),
                url: Self::url_for(container, name),
            }),
            None => Err(ExtractError::DocumentNotFound {
                container: container.to_string(),
                name: name.to_string(),
            }),
        }
    }

    async fn upload(
        &self,
        container: &str,
        name: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> ExtractResult<String> {
        self.blobs
            .lock()
            .unwrap()
            .insert((container.to_string(), name.to_string()), bytes.to_vec());
        Ok(Self::url_for(container, name))
    }
}
