//! Page linearization: flatten analyzed pages into one text document with the
//! table block and image URLs spliced in at their anchor lines.
//!
//! Splicing is byte-exact on both anchors. A line matches the table trigger
//! only when its content equals the configured trigger sentence byte for
//! byte, and a line earns an `Image URL:` follow-up only when it equals a
//! figure caption from the same page byte for byte. Fuzzy matching here would
//! make output depend on the analyzer's whitespace habits.

use crate::model::{DocumentPage, FigureMap};
use std::collections::HashMap;
use tracing::info;

/// Flatten `pages` (ascending page order) into the text handed to the prompt
/// builder.
///
/// The table block is inserted immediately before every line equal to
/// `table_trigger`; the matching line itself is kept. After a line equal to a
/// caption of a figure on the same page, an `Image URL: {url}` line is
/// appended. When a page carries duplicate captions, the last figure wins.
pub fn linearize(
    pages: &[DocumentPage],
    table_text: &str,
    figures: &FigureMap,
    table_trigger: &str,
) -> String {
    let mut ordered: Vec<&DocumentPage> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_number);

    let mut out = String::new();
    for page in ordered {
        if page.lines.is_empty() {
            info!("Page {} has no lines, skipping", page.page_number);
            continue;
        }

        let captions: HashMap<&str, &str> = figures
            .get(&page.page_number)
            .map(|figs| {
                figs.iter()
                    .map(|f| (f.caption.as_str(), f.image_url.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        for line in &page.lines {
            if line.content == table_trigger {
                out.push_str(table_text);
            }
            out.push_str(&line.content);
            out.push('\n');
            if let Some(url) = captions.get(line.content.as_str()) {
                out.push_str(&format!("Image URL: {url}\n"));
            }
        }
    }
    out
}
