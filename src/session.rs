//! Reader session.
//!
//! [`ReaderSession`] is the context object tying the pieces together: it owns
//! the content tree, the viewer state machine, the theme and the preferences,
//! and runs the open-document pipeline (fetch, render, extract outline).

use crate::backend::{DocumentBackend, PaginatedDocument};
use crate::config::LibraryConfig;
use crate::content::ContentTreeLoader;
use crate::error::{Error, Result};
use crate::fetch::{DefaultFetcher, DocumentFetcher, FetchedDocument};
use crate::model::{Block, ContentTree, DocumentKind};
use crate::outline::{DocumentHandle, MarkupSource, OutlineExtractor};
use crate::prefs::{Preferences, ThemeSelection};
use crate::sync::HighlightUpdate;
use crate::viewer::{prerender_all, DocumentToken, OpenDocument, PrerenderReport, ViewerStateMachine};
use std::sync::Arc;

/// Content of the open document.
pub enum DocumentContent {
    /// Markup source text
    Markup(String),
    /// Opened paginated document
    Paginated(Arc<dyn PaginatedDocument>),
    /// Rendered flow blocks
    Flow(Vec<Block>),
}

impl std::fmt::Debug for DocumentContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentContent::Markup(text) => f.debug_tuple("Markup").field(&text.len()).finish(),
            DocumentContent::Paginated(doc) => f
                .debug_struct("Paginated")
                .field("pages", &doc.page_count())
                .finish(),
            DocumentContent::Flow(blocks) => f.debug_tuple("Flow").field(&blocks.len()).finish(),
        }
    }
}

/// Result of opening a document.
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    /// Token of the newly open document
    pub token: DocumentToken,
    /// Document kind
    pub kind: DocumentKind,
    /// Folders to expand so the leaf is visible, outermost first
    pub expanded_folders: Vec<String>,
    /// Initial outline highlight
    pub highlight: Option<HighlightUpdate>,
}

/// Owns everything one reader works with.
pub struct ReaderSession {
    config: LibraryConfig,
    prefs: Preferences,
    loader: ContentTreeLoader,
    fetcher: Arc<dyn DocumentFetcher>,
    backend: Option<Arc<dyn DocumentBackend>>,
    extractor: OutlineExtractor,
    tree: Option<ContentTree>,
    viewer: ViewerStateMachine,
    content: Option<DocumentContent>,
    theme: ThemeSelection,
}

impl ReaderSession {
    /// Create a session for a configuration.
    pub fn new(config: LibraryConfig, prefs: Preferences) -> Self {
        let loader = ContentTreeLoader::from_config(&config, prefs.clone());
        let fetcher: Arc<dyn DocumentFetcher> = Arc::new(DefaultFetcher::new(&config));
        let extractor = OutlineExtractor::new(config.headings.clone());
        let theme = prefs.theme();
        Self {
            config,
            prefs,
            loader,
            fetcher,
            backend: None,
            extractor,
            tree: None,
            viewer: ViewerStateMachine::new(),
            content: None,
            theme,
        }
    }

    /// Replace the content tree loader.
    pub fn with_loader(mut self, loader: ContentTreeLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the document fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Attach the renderer backend for paginated and flow documents.
    pub fn with_backend(mut self, backend: Arc<dyn DocumentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// The loaded content tree.
    pub fn tree(&self) -> Option<&ContentTree> {
        self.tree.as_ref()
    }

    pub fn viewer(&self) -> &ViewerStateMachine {
        &self.viewer
    }

    /// Mutable access for navigation, zoom and scroll commands.
    pub fn viewer_mut(&mut self) -> &mut ViewerStateMachine {
        &mut self.viewer
    }

    /// Content of the open document.
    pub fn content(&self) -> Option<&DocumentContent> {
        self.content.as_ref()
    }

    /// Load (or reload) the content tree, replacing the previous one.
    pub async fn load_tree(&mut self) -> Result<&ContentTree> {
        let tree = self.loader.load().await?;
        Ok(self.tree.insert(tree))
    }

    /// Folders to expand so `path` is visible.
    pub fn expand_to(&self, path: &str) -> Vec<String> {
        self.tree
            .as_ref()
            .map(|tree| tree.ancestor_folders(path))
            .unwrap_or_default()
    }

    fn backend(&self, kind: DocumentKind) -> Result<Arc<dyn DocumentBackend>> {
        self.backend
            .clone()
            .ok_or_else(|| Error::Unsupported(format!("no renderer attached for {} documents", kind)))
    }

    /// Open the leaf at `path`.
    ///
    /// On failure the previous document is closed and its outline cleared.
    pub async fn open(&mut self, path: &str) -> Result<OpenedDocument> {
        let result = self.open_inner(path).await;
        if let Err(e) = &result {
            log::warn!("Failed to open {}: {}", path, e);
            self.viewer.close();
            self.content = None;
        }
        result
    }

    async fn open_inner(&mut self, path: &str) -> Result<OpenedDocument> {
        let path = path.trim_start_matches('/');
        let kind = self
            .tree
            .as_ref()
            .and_then(|tree| tree.find(path))
            .and_then(|node| node.kind())
            .ok_or_else(|| Error::DocumentNotFound(path.to_string()))?;

        let fetched = self.fetcher.fetch(path, kind).await?;
        let (content, document) = match (kind, fetched) {
            (DocumentKind::Markup, FetchedDocument::Text(text)) => {
                (DocumentContent::Markup(text), OpenDocument::Markup)
            }
            (DocumentKind::Paginated, FetchedDocument::Binary { url, .. }) => {
                let doc = self.backend(kind)?.open_paginated(&url).await?;
                let total_pages = doc.page_count();
                (
                    DocumentContent::Paginated(doc),
                    OpenDocument::Paginated { total_pages },
                )
            }
            (DocumentKind::Flow, FetchedDocument::Binary { url, .. }) => {
                let blocks = self.backend(kind)?.convert_flow(&url).await?;
                (DocumentContent::Flow(blocks), OpenDocument::Flow)
            }
            (kind, _) => {
                return Err(Error::Render(format!(
                    "fetcher returned the wrong payload for a {} document",
                    kind
                )))
            }
        };

        let token = self.viewer.open(path, document);
        let outline = {
            let handle = match &content {
                DocumentContent::Markup(text) => DocumentHandle::Markup(MarkupSource::Markdown(text)),
                DocumentContent::Paginated(doc) => DocumentHandle::Paginated(doc.as_ref()),
                DocumentContent::Flow(blocks) => DocumentHandle::Flow(blocks),
            };
            self.extractor.extract(handle).await?
        };
        self.content = Some(content);
        let highlight = self.viewer.set_outline(token, outline);

        log::info!("Opened {} ({})", path, kind);
        Ok(OpenedDocument {
            token,
            kind,
            expanded_folders: self.expand_to(path),
            highlight,
        })
    }

    /// Render every page of the open paginated document at the current zoom.
    pub async fn prerender(&self) -> Result<PrerenderReport> {
        match (&self.content, self.viewer.state().zoom_scale()) {
            (Some(DocumentContent::Paginated(doc)), Some(zoom)) => {
                Ok(prerender_all(doc.as_ref(), zoom).await)
            }
            _ => Err(Error::Unsupported(
                "pre-rendering needs an open paginated document".into(),
            )),
        }
    }

    /// Current theme.
    pub fn theme(&self) -> &ThemeSelection {
        &self.theme
    }

    /// Change and persist the theme.
    pub fn set_theme(&mut self, theme: ThemeSelection) {
        self.prefs.set_theme(&theme);
        self.theme = theme;
    }
}
