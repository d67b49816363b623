//! HTTP server binary: wires production clients from environment variables
//! and serves the extraction endpoint.
//!
//! Required environment:
//! - `STORAGE_ACCOUNT_URL` (and optional `STORAGE_SAS_TOKEN`)
//! - `OPENAI_ENDPOINT`, `OPENAI_KEY` (and optional `OPENAI_DEPLOYMENT`)
//! - `COSMOSDB_ENDPOINT`, `COSMOSDB_KEY`
//! - with `REGDOC_ANALYZER=layout` (the default):
//!   `DOCUMENT_INTELLIGENCE_ENDPOINT`, `DOCUMENT_INTELLIGENCE_KEY`
//!
//! `REGDOC_ANALYZER=pdftext` switches to local text extraction, which needs
//! no layout service but detects no tables or figures.

use anyhow::Context;
use regdoc_extract::clients::{
    AzureBlobStore, AzureOpenAiClient, CosmosAuditStore, DocumentAnalyzer, LayoutServiceAnalyzer,
    PdfTextAnalyzer,
};
use regdoc_extract::{router, AppState, Clients, ExtractionConfig};
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regdoc_extract=info,regdoc_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ExtractionConfig::default());
    let clients = Arc::new(build_clients(&config)?);

    let host = std::env::var("REGDOC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("REGDOC_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .context("REGDOC_PORT must be a port number")?;
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("invalid listen address")?;

    let app = router(AppState { clients, config });
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Shut down cleanly");
    Ok(())
}

fn build_clients(config: &ExtractionConfig) -> anyhow::Result<Clients> {
    let account_url: Url = required_env("STORAGE_ACCOUNT_URL")?
        .parse()
        .context("STORAGE_ACCOUNT_URL must be a URL")?;
    let sas_token = std::env::var("STORAGE_SAS_TOKEN").ok();
    let store = AzureBlobStore::new(account_url, sas_token);

    let analyzer: Arc<dyn DocumentAnalyzer> =
        match std::env::var("REGDOC_ANALYZER").as_deref().unwrap_or("layout") {
            "pdftext" => {
                info!("Using local pdf text extraction (no tables or figures)");
                Arc::new(PdfTextAnalyzer::new())
            }
            "layout" => {
                let endpoint: Url = required_env("DOCUMENT_INTELLIGENCE_ENDPOINT")?
                    .parse()
                    .context("DOCUMENT_INTELLIGENCE_ENDPOINT must be a URL")?;
                let key = required_env("DOCUMENT_INTELLIGENCE_KEY")?;
                Arc::new(LayoutServiceAnalyzer::new(
                    endpoint,
                    key,
                    config.analysis_poll_interval_ms,
                    config.analysis_timeout_secs,
                ))
            }
            other => anyhow::bail!("unknown REGDOC_ANALYZER '{other}' (use 'layout' or 'pdftext')"),
        };

    let openai_endpoint: Url = required_env("OPENAI_ENDPOINT")?
        .parse()
        .context("OPENAI_ENDPOINT must be a URL")?;
    let openai_key = required_env("OPENAI_KEY")?;
    let deployment =
        std::env::var("OPENAI_DEPLOYMENT").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let completion = AzureOpenAiClient::new(openai_endpoint, openai_key, deployment);

    let cosmos_endpoint: Url = required_env("COSMOSDB_ENDPOINT")?
        .parse()
        .context("COSMOSDB_ENDPOINT must be a URL")?;
    let cosmos_key = required_env("COSMOSDB_KEY")?;
    let database =
        std::env::var("COSMOS_DATABASE").unwrap_or_else(|_| "sempradocumentcontent".to_string());
    let collection = std::env::var("COSMOS_COLLECTION").unwrap_or_else(|_| "auditrail".to_string());
    let audit = CosmosAuditStore::new(cosmos_endpoint, &cosmos_key, database, collection)
        .context("invalid Cosmos configuration")?;

    Ok(Clients {
        store: Arc::new(store),
        analyzer,
        completion: Arc::new(completion),
        audit: Arc::new(audit),
    })
}

fn required_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing required environment variable {name}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
