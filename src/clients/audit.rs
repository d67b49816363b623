//! Audit trail persistence.
//!
//! [`AuditStore`] appends one immutable [`ExtractionRecord`] per pipeline
//! invocation. The store is best-effort from the caller's perspective: the
//! orchestrator logs a failed write and moves on, because by the time the
//! audit entry is written the primary result (or error) already exists and
//! losing an audit row must not turn a successful extraction into a 500.
//!
//! [`CosmosAuditStore`] writes to a Cosmos DB collection over REST using
//! master-key authentication (HMAC-SHA256 over the canonical request string);
//! [`MemoryAuditStore`] collects records in memory for tests.

use crate::error::{ExtractError, ExtractResult};
use crate::model::ExtractionRecord;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;
use std::sync::Mutex;
use tracing::{debug, error};

type HmacSha256 = Hmac<Sha256>;

/// Durable append-only audit log as the pipeline sees it.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist one record. Ids are fresh per record; overwriting is never
    /// intended.
    async fn record(&self, entry: &ExtractionRecord) -> ExtractResult<()>;
}

/// Write `entry` to `store`, logging instead of failing on error.
///
/// This is the only way the pipeline ever calls an [`AuditStore`].
pub async fn record_best_effort(store: &dyn AuditStore, entry: &ExtractionRecord) {
    match store.record(entry).await {
        Ok(()) => debug!("Audit record '{}' stored", entry.id),
        Err(e) => error!("Failed to store audit record '{}': {e}", entry.id),
    }
}

// ── Cosmos DB ────────────────────────────────────────────────────────────

/// Cosmos DB document store over REST with master-key auth.
pub struct CosmosAuditStore {
    client: reqwest::Client,
    endpoint: Url,
    /// Decoded master key bytes.
    key: Vec<u8>,
    database: String,
    collection: String,
}

impl CosmosAuditStore {
    /// `master_key` is the base64 key string from the portal.
    pub fn new(
        endpoint: Url,
        master_key: &str,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> ExtractResult<Self> {
        let key = BASE64.decode(master_key).map_err(|e| {
            ExtractError::InvalidConfig(format!("Cosmos master key is not valid base64: {e}"))
        })?;
        Ok(Self {
            client: crate::clients::http_client(std::time::Duration::from_secs(30)),
            endpoint,
            key,
            database: database.into(),
            collection: collection.into(),
        })
    }

    fn resource_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.collection)
    }

    fn docs_url(&self) -> String {
        let base = self.endpoint.as_str().trim_end_matches('/');
        format!("{base}/{}/docs", self.resource_link())
    }

    /// Master-key authorization header for a `POST …/docs` request.
    ///
    /// The canonical string is `verb \n resourceType \n resourceLink \n
    /// date \n \n` with verb, resource type, and date lowercased.
    fn auth_header(&self, date_rfc1123: &str) -> String {
        let string_to_sign = format!(
            "post\ndocs\n{}\n{}\n\n",
            self.resource_link(),
            date_rfc1123.to_lowercase()
        );
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        percent_encode(&format!("type=master&ver=1.0&sig={signature}"))
    }
}

#[async_trait]
impl AuditStore for CosmosAuditStore {
    async fn record(&self, entry: &ExtractionRecord) -> ExtractResult<()> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let response = self
            .client
            .post(self.docs_url())
            .header("authorization", self.auth_header(&date))
            .header("x-ms-date", &date)
            .header("x-ms-version", "2018-12-31")
            .header(
                "x-ms-documentdb-partitionkey",
                format!("[\"{}\"]", entry.id),
            )
            .json(entry)
            .send()
            .await
            .map_err(|e| ExtractError::Internal(format!("audit store unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::Internal(format!(
                "audit store rejected record: HTTP {status}: {detail}"
            )));
        }
        Ok(())
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set, which is
/// what Cosmos expects for the authorization header value.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

// ── In-memory store ──────────────────────────────────────────────────────

/// In-memory [`AuditStore`] for tests.
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<ExtractionRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records written so far, in order.
    pub fn entries(&self) -> Vec<ExtractionRecord> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn record(&self, entry: &ExtractionRecord) -> ExtractResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
