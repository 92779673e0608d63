//! Outline extraction.
//!
//! Every document kind is reduced to a flat, document-order list of headings
//! which is then nested by level with [`nest`]. A heading of level `L` becomes
//! a child of the nearest preceding heading with a level below `L`, so skipped
//! levels (an `h3` directly under an `h1`) still nest under the closest
//! shallower heading.
//!
//! ## Example
//!
//! ```no_run
//! use folio::outline::{DocumentHandle, MarkupSource, OutlineExtractor};
//!
//! # async fn run() -> folio::Result<()> {
//! let extractor = OutlineExtractor::default();
//! let handle = DocumentHandle::Markup(MarkupSource::Markdown("# Intro\n## Setup"));
//! if let Some(outline) = extractor.extract(handle).await? {
//!     println!("{} entries", outline.total_items());
//! }
//! # Ok(())
//! # }
//! ```

mod flow;
mod markup;
mod paginated;

pub use flow::HeadingPolicy;
pub use markup::slugify;

use crate::backend::PaginatedDocument;
use crate::error::Result;
use crate::model::{Block, Outline, OutlineNode};
use std::collections::{HashMap, HashSet};

/// Hands out outline ids that are unique within one outline.
///
/// A taken id gets the first free `-1`, `-2`, ... suffix, so a generated
/// suffix never collides with an id another heading already owns.
#[derive(Debug, Default)]
pub(crate) struct UniqueIds {
    used: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl UniqueIds {
    /// Mark an id as taken without allocating it.
    pub(crate) fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }

    /// Allocate `base`, or the first free suffixed form of it.
    pub(crate) fn allocate(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let next = self.suffixes.entry(base.clone()).or_insert(0);
        loop {
            *next += 1;
            let candidate = format!("{}-{}", base, next);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Source form of a markup document.
#[derive(Debug, Clone, Copy)]
pub enum MarkupSource<'a> {
    /// Rendered block list with native heading elements
    Blocks(&'a [Block]),
    /// Raw markdown text
    Markdown(&'a str),
}

/// A loaded document, one variant per document kind.
#[derive(Clone, Copy)]
pub enum DocumentHandle<'a> {
    /// Markup document
    Markup(MarkupSource<'a>),
    /// Opened paginated document
    Paginated(&'a dyn PaginatedDocument),
    /// Rendered flow document
    Flow(&'a [Block]),
}

impl std::fmt::Debug for DocumentHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentHandle::Markup(source) => f.debug_tuple("Markup").field(source).finish(),
            DocumentHandle::Paginated(doc) => f
                .debug_struct("Paginated")
                .field("pages", &doc.page_count())
                .finish(),
            DocumentHandle::Flow(blocks) => f.debug_tuple("Flow").field(&blocks.len()).finish(),
        }
    }
}

/// Flat, document-order headings of raw markdown text.
pub fn markdown_headings(text: &str) -> Vec<OutlineNode> {
    markup::from_markdown(text)
}

/// Nest a flat, document-order heading list by level.
///
/// Children already present on the input nodes are kept.
pub fn nest(flat: Vec<OutlineNode>) -> Vec<OutlineNode> {
    fn attach(node: OutlineNode, stack: &mut [OutlineNode], roots: &mut Vec<OutlineNode>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    let mut roots = Vec::new();
    let mut stack: Vec<OutlineNode> = Vec::new();

    for node in flat {
        while stack.last().is_some_and(|top| top.level >= node.level) {
            if let Some(done) = stack.pop() {
                attach(done, &mut stack, &mut roots);
            }
        }
        stack.push(node);
    }
    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut roots);
    }

    roots
}

/// Builds outlines for any document kind.
#[derive(Debug, Clone, Default)]
pub struct OutlineExtractor {
    policy: HeadingPolicy,
}

impl OutlineExtractor {
    /// Create an extractor with a flow heading policy.
    pub fn new(policy: HeadingPolicy) -> Self {
        Self { policy }
    }

    /// The flow heading policy.
    pub fn policy(&self) -> &HeadingPolicy {
        &self.policy
    }

    /// Extract the outline of a document.
    ///
    /// `Ok(None)` means the document has no usable headings or bookmarks.
    pub async fn extract(&self, handle: DocumentHandle<'_>) -> Result<Option<Outline>> {
        self.policy.validate()?;

        let flat = match handle {
            DocumentHandle::Markup(MarkupSource::Blocks(blocks)) => markup::from_blocks(blocks),
            DocumentHandle::Markup(MarkupSource::Markdown(text)) => markup::from_markdown(text),
            DocumentHandle::Paginated(doc) => paginated::headings(doc).await.unwrap_or_default(),
            DocumentHandle::Flow(blocks) => flow::headings(blocks, &self.policy),
        };

        if flat.is_empty() {
            log::debug!("No outline for {:?}", handle);
            return Ok(None);
        }

        let outline = Outline::new(nest(flat));
        log::debug!("Extracted outline with {} entries", outline.total_items());
        Ok(Some(outline))
    }
}
