//! Standalone HTML export of one or more feed pages.

use crate::config::Config;
use crate::display::{render_document, Flag, SharedSurface, Targets};
use crate::feeds::ProfileSource;
use crate::reader::{Outcome, Reader};
use std::sync::Arc;

/// Load up to `pages` pages for `username`, following the "load more"
/// cursor, and render everything into one HTML document.
pub async fn render_pages(
    config: &Config,
    source: Arc<dyn ProfileSource>,
    username: &str,
    max_timestamp: Option<i64>,
    pages: usize,
) -> String {
    let surface = SharedSurface::new();
    let mut reader = Reader::new(
        source,
        Targets {
            display: Box::new(surface.clone()),
            loaders: Vec::new(),
            load_more: Box::new(Flag::default()),
        },
    )
    .with_page_size(config.page_size);

    let mut cursor = max_timestamp;
    for _ in 0..pages.max(1) {
        match reader.show_data(username, cursor).await {
            Outcome::Loaded {
                has_more: true,
                cursor: last,
                ..
            } => cursor = Some(last.saturating_sub(1)),
            _ => break,
        }
    }

    render_document(&format!("{} - catfeed", username), &surface.snapshot())
}
