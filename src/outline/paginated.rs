//! Bookmark resolution for paginated documents.

use crate::backend::{Bookmark, Destination, PaginatedDocument, PageTarget};
use crate::error::{Error, Result};
use crate::model::{OutlineNode, PositionRef};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Resolve a destination to a 1-indexed page number.
async fn resolve_page(doc: &dyn PaginatedDocument, destination: &Destination) -> Result<u32> {
    let target: PageTarget = match destination {
        Destination::Explicit(target) => *target,
        Destination::Named(name) => doc.resolve_named(name).await?.ok_or_else(|| {
            Error::DestinationResolution(format!("unknown named destination '{}'", name))
        })?,
    };
    let index = doc.page_index(&target).await?;
    Ok(index.saturating_add(1))
}

/// Resolve one level of bookmarks and everything below it, in pre-order.
fn resolve_level<'a>(
    doc: &'a dyn PaginatedDocument,
    items: &'a [Bookmark],
    depth: u8,
) -> BoxFuture<'a, Vec<OutlineNode>> {
    async move {
        let mut flat = Vec::new();
        for item in items {
            let page = match &item.destination {
                Some(destination) => match resolve_page(doc, destination).await {
                    Ok(page) => page,
                    Err(e) => {
                        log::warn!(
                            "Bookmark '{}' could not be resolved, using page 1: {}",
                            item.title,
                            e
                        );
                        1
                    }
                },
                None => 1,
            };
            flat.push(OutlineNode::new(
                String::new(),
                item.title.trim(),
                depth.saturating_add(1),
                PositionRef::Page { page },
            ));
            flat.extend(resolve_level(doc, &item.children, depth.saturating_add(1)).await);
        }
        flat
    }
    .boxed()
}

/// Flat, document-order headings from the bookmark list.
///
/// Returns `None` when the document has no bookmarks or the list cannot be
/// read at all.
pub(crate) async fn headings(doc: &dyn PaginatedDocument) -> Option<Vec<OutlineNode>> {
    let bookmarks = match doc.bookmarks().await {
        Ok(bookmarks) => bookmarks,
        Err(e) => {
            log::warn!("Failed to read bookmark list: {}", e);
            return None;
        }
    };
    if bookmarks.is_empty() {
        return None;
    }

    let mut flat = resolve_level(doc, &bookmarks, 0).await;
    for (n, node) in flat.iter_mut().enumerate() {
        node.id = format!("bookmark-{}", n);
    }
    Some(flat)
}
