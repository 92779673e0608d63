//! Continuous-mode page pre-rendering.

use crate::backend::{PaginatedDocument, RenderedPage};
use crate::error::Error;
use futures::future::join_all;

/// Outcome of rendering every page of a document.
#[derive(Debug, Default)]
pub struct PrerenderReport {
    /// Pages that rendered, in page order
    pub rendered: Vec<RenderedPage>,
    /// Pages that failed, with the error for each
    pub failed: Vec<(u32, Error)>,
}

impl PrerenderReport {
    /// Check if every page rendered.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Render every page concurrently at `scale`.
///
/// Resolves once all renders have settled. A failed page is reported and
/// does not affect the others.
pub async fn prerender_all(doc: &dyn PaginatedDocument, scale: f32) -> PrerenderReport {
    let total = doc.page_count();
    let results = join_all((1..=total).map(|page| async move {
        (page, doc.render_page(page, scale).await)
    }))
    .await;

    let mut report = PrerenderReport::default();
    for (page, result) in results {
        match result {
            Ok(rendered) => report.rendered.push(rendered),
            Err(e) => {
                log::warn!("Failed to render page {}: {}", page, e);
                report.failed.push((page, e));
            }
        }
    }
    log::debug!(
        "Pre-rendered {}/{} pages at scale {:.2}",
        report.rendered.len(),
        total,
        scale
    );
    report
}
