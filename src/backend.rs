//! Renderer boundary.
//!
//! Provides trait-based interfaces for the external document renderers,
//! isolating the concrete PDF and DOCX libraries from outline extraction
//! and viewer state.

use crate::error::Result;
use crate::model::Block;
use async_trait::async_trait;
use std::sync::Arc;

/// Page object reference: (object number, generation number).
pub type PageRef = (u32, u16);

/// The target of an explicit destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// Indirect reference to a page object
    Ref(PageRef),
    /// Zero-based page index
    Index(u32),
}

/// A bookmark destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Explicit destination naming a page
    Explicit(PageTarget),
    /// Named destination, resolved through the document's name tree
    Named(String),
}

/// One entry of a paginated document's bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Display title
    pub title: String,
    /// Destination, if the entry has one
    pub destination: Option<Destination>,
    /// Nested entries
    pub children: Vec<Bookmark>,
}

impl Bookmark {
    /// Create a childless bookmark.
    pub fn new(title: impl Into<String>, destination: Option<Destination>) -> Self {
        Self {
            title: title.into(),
            destination,
            children: Vec::new(),
        }
    }

    /// Add nested bookmarks.
    pub fn with_children(mut self, children: Vec<Bookmark>) -> Self {
        self.children = children;
        self
    }
}

/// Intrinsic page size at zoom 1.0, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// A rasterized page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

/// An opened paginated document.
#[async_trait]
pub trait PaginatedDocument: Send + Sync {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// The bookmark list. Empty when the document has none.
    async fn bookmarks(&self) -> Result<Vec<Bookmark>>;

    /// Resolve a named destination to an explicit target.
    async fn resolve_named(&self, name: &str) -> Result<Option<PageTarget>>;

    /// Zero-based page index of a target.
    async fn page_index(&self, target: &PageTarget) -> Result<u32>;

    /// Intrinsic size of a page (1-indexed).
    async fn page_size(&self, page: u32) -> Result<PageSize>;

    /// Rasterize a page (1-indexed) at a scale.
    async fn render_page(&self, page: u32, scale: f32) -> Result<RenderedPage>;
}

/// Opens documents through the external renderers.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Open a paginated document.
    async fn open_paginated(&self, url: &str) -> Result<Arc<dyn PaginatedDocument>>;

    /// Convert a flow payload into rendered blocks in document order.
    async fn convert_flow(&self, url: &str) -> Result<Vec<Block>>;
}
