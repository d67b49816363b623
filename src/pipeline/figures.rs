//! Figure resolution: fetch rendered figure images, upload them to storage,
//! and build the page-keyed caption → URL map the linearizer matches against.
//!
//! Fetch failures propagate instead of being skipped: a figure that silently
//! fails to resolve would make caption matching drop image references with
//! no trace. Upload names are deterministic (`{document}_{figure_id}.png`)
//! and always overwrite, so re-running a document cannot accumulate stale
//! duplicates.

use crate::clients::layout::DocumentAnalyzer;
use crate::clients::storage::BlobStore;
use crate::error::{ExtractError, ExtractResult};
use crate::model::{AnalysisHandle, DocumentFigure, FigureMap, PageFigure};
use tracing::debug;

/// Resolve every figure with a non-empty id into an uploaded image URL,
/// grouped by bounding page (first region wins, default page 1), preserving
/// discovery order within a page.
///
/// Two figures with identical captions on the same page are not
/// distinguishable downstream; the last one resolved wins the caption match.
pub async fn resolve_figures(
    analyzer: &dyn DocumentAnalyzer,
    handle: Option<&AnalysisHandle>,
    figures: &[DocumentFigure],
    store: &dyn BlobStore,
    images_container: &str,
    document_name: &str,
) -> ExtractResult<FigureMap> {
    let mut map = FigureMap::new();

    for figure in figures {
        let figure_id = match figure.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => continue,
        };
        let handle = handle.ok_or_else(|| ExtractError::FigureFetch {
            figure_id: figure_id.to_string(),
            reason: "analyzer provided figures without an analysis handle".into(),
        })?;

        let bytes = analyzer.fetch_figure(handle, figure_id).await?;
        let blob_name = format!("{document_name}_{figure_id}.png");
        let image_url = store
            .upload(images_container, &blob_name, &bytes, "image/png")
            .await?;

        let page_number = figure.page_number();
        debug!("Resolved figure '{figure_id}' on page {page_number} -> {image_url}");
        map.entry(page_number).or_default().push(PageFigure {
            caption: figure.caption.clone().unwrap_or_default(),
            image_url,
        });
    }

    Ok(map)
}
