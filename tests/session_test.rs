//! Integration tests for the reader session pipeline.

use async_trait::async_trait;
use folio::backend::{
    Bookmark, Destination, DocumentBackend, PageSize, PageTarget, PaginatedDocument, RenderedPage,
};
use folio::error::{Error, Result};
use folio::fetch::{DocumentFetcher, FetchedDocument};
use folio::session::DocumentContent;
use folio::{
    Block, DocumentKind, LibraryConfig, Preferences, ReaderSession, ThemePreset, ThemeSelection,
};
use folio::sync::{heading_geometry, Viewport};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Mock paginated document whose odd pages fail to render.
struct MockPdf {
    pages: u32,
}

#[async_trait]
impl PaginatedDocument for MockPdf {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(vec![
            Bookmark::new("Start", Some(Destination::Explicit(PageTarget::Index(0)))),
            Bookmark::new("End", Some(Destination::Explicit(PageTarget::Index(self.pages - 1)))),
        ])
    }

    async fn resolve_named(&self, _name: &str) -> Result<Option<PageTarget>> {
        Ok(None)
    }

    async fn page_index(&self, target: &PageTarget) -> Result<u32> {
        match target {
            PageTarget::Index(i) => Ok(*i),
            PageTarget::Ref(r) => Err(Error::Render(format!("unknown ref {:?}", r))),
        }
    }

    async fn page_size(&self, _page: u32) -> Result<PageSize> {
        Ok(PageSize {
            width: 600.0,
            height: 800.0,
        })
    }

    async fn render_page(&self, page: u32, scale: f32) -> Result<RenderedPage> {
        if page % 2 == 1 {
            return Err(Error::Render(format!("page {} is corrupt", page)));
        }
        Ok(RenderedPage {
            page,
            width: (600.0 * scale) as u32,
            height: (800.0 * scale) as u32,
        })
    }
}

/// Mock renderer backend.
struct MockBackend;

#[async_trait]
impl DocumentBackend for MockBackend {
    async fn open_paginated(&self, url: &str) -> Result<Arc<dyn PaginatedDocument>> {
        if url.contains("broken") {
            return Err(Error::Render("not a PDF".into()));
        }
        Ok(Arc::new(MockPdf { pages: 4 }))
    }

    async fn convert_flow(&self, _url: &str) -> Result<Vec<Block>> {
        Ok(vec![
            Block::paragraph("Summary").with_font_size(24.0).bold(),
            Block::paragraph("Body").with_font_size(12.0),
        ])
    }
}

/// Mock fetcher serving binary locations only.
struct BinaryFetcher;

#[async_trait]
impl DocumentFetcher for BinaryFetcher {
    async fn fetch(&self, path: &str, kind: DocumentKind) -> Result<FetchedDocument> {
        Ok(FetchedDocument::Binary {
            kind,
            url: format!("mock://{}", path),
        })
    }
}

fn write_library(root: &Path) -> LibraryConfig {
    let posts = root.join("posts");
    std::fs::create_dir_all(posts.join("guides")).unwrap();
    std::fs::write(
        posts.join("guides").join("intro.md"),
        "# Intro\n\ntext\n\n## Install\n\n## Usage\n",
    )
    .unwrap();
    std::fs::write(posts.join("empty.md"), "no headings here\n").unwrap();

    let manifest = root.join("posts.json");
    std::fs::write(
        &manifest,
        r#"[
            {"type": "folder", "name": "guides", "path": "guides", "children": [
                {"type": "file", "name": "intro.md", "title": "intro", "path": "guides/intro.md", "fileType": "markdown"}
            ]},
            {"type": "file", "name": "empty.md", "title": "empty", "path": "empty.md", "fileType": "markdown"},
            {"type": "file", "name": "gone.md", "title": "gone", "path": "gone.md", "fileType": "markdown"},
            {"type": "file", "name": "book.pdf", "title": "book", "path": "book.pdf", "fileType": "pdf"},
            {"type": "file", "name": "broken.pdf", "title": "broken", "path": "broken.pdf", "fileType": "pdf"},
            {"type": "file", "name": "memo.docx", "title": "memo", "path": "memo.docx", "fileType": "word"}
        ]"#,
    )
    .unwrap();

    LibraryConfig::new()
        .with_manifest(manifest)
        .with_posts_dir(posts)
}

#[tokio::test]
async fn test_open_markdown_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory());
    assert_eq!(session.load_tree().await.unwrap().leaf_count(), 6);

    let opened = session.open("/guides/intro.md").await.unwrap();
    assert_eq!(opened.kind, DocumentKind::Markup);
    assert_eq!(opened.expanded_folders, vec!["guides".to_string()]);
    assert!(opened.highlight.is_some());

    let state = session.viewer().state();
    assert_eq!(state.active_leaf_path(), Some("guides/intro.md"));
    let outline = state.outline().expect("outline");
    assert_eq!(outline.total_items(), 3);
    assert_eq!(outline.items[0].children.len(), 2);
    // The first heading sits on line 0, so it is current right away
    assert_eq!(state.highlighted_node_id(), Some("intro"));
}

#[tokio::test]
async fn test_markdown_scroll_follows_headings() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory());
    session.load_tree().await.unwrap();
    let opened = session.open("guides/intro.md").await.unwrap();

    // Rendered heading elements: intro, a paragraph, install, usage
    let outline = session.viewer().state().outline().unwrap().clone();
    let geometry = heading_geometry(
        &outline,
        [
            ("intro", 0.0, 40.0),
            ("install", 400.0, 30.0),
            ("usage", 900.0, 30.0),
        ],
    );

    let t = session
        .viewer_mut()
        .on_scroll(opened.token, Instant::now(), &geometry, Viewport::new(250.0, 400.0))
        .expect("first sample passes");
    assert_eq!(t.highlight.unwrap().highlighted.as_deref(), Some("install"));
    assert_eq!(session.viewer().state().highlighted_node_id(), Some("install"));
}

#[tokio::test]
async fn test_open_without_headings() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory());
    session.load_tree().await.unwrap();

    session.open("empty.md").await.unwrap();
    assert!(session.viewer().state().outline().is_none());
    assert!(matches!(
        session.content(),
        Some(DocumentContent::Markup(_))
    ));
}

#[tokio::test]
async fn test_failed_fetch_clears_previous_outline() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory());
    session.load_tree().await.unwrap();
    session.open("guides/intro.md").await.unwrap();
    assert!(session.viewer().state().outline().is_some());

    let result = session.open("gone.md").await;
    assert!(matches!(result, Err(Error::DocumentNotFound(_))));
    assert!(session.viewer().state().outline().is_none());
    assert!(session.viewer().state().active_leaf_path().is_none());
    assert!(session.content().is_none());
}

#[tokio::test]
async fn test_unknown_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory());
    session.load_tree().await.unwrap();
    assert!(matches!(
        session.open("nowhere.md").await,
        Err(Error::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn test_binary_documents_need_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory())
        .with_fetcher(Arc::new(BinaryFetcher));
    session.load_tree().await.unwrap();
    assert!(matches!(
        session.open("book.pdf").await,
        Err(Error::Unsupported(_))
    ));
}

#[tokio::test]
async fn test_open_paginated_and_prerender() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory())
        .with_fetcher(Arc::new(BinaryFetcher))
        .with_backend(Arc::new(MockBackend));
    session.load_tree().await.unwrap();

    let opened = session.open("book.pdf").await.unwrap();
    assert_eq!(opened.kind, DocumentKind::Paginated);
    assert_eq!(session.viewer().state().total_pages(), Some(4));
    assert_eq!(session.viewer().state().highlighted_node_id(), Some("bookmark-0"));

    let report = session.prerender().await.unwrap();
    assert!(!report.is_complete());
    let rendered: Vec<u32> = report.rendered.iter().map(|p| p.page).collect();
    let failed: Vec<u32> = report.failed.iter().map(|(p, _)| *p).collect();
    assert_eq!(rendered, vec![2, 4]);
    assert_eq!(failed, vec![1, 3]);

    session.viewer_mut().jump_to(4).unwrap();
    assert_eq!(session.viewer().state().highlighted_node_id(), Some("bookmark-1"));
}

#[tokio::test]
async fn test_renderer_failure_closes_viewer() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory())
        .with_fetcher(Arc::new(BinaryFetcher))
        .with_backend(Arc::new(MockBackend));
    session.load_tree().await.unwrap();

    session.open("book.pdf").await.unwrap();
    assert!(matches!(
        session.open("broken.pdf").await,
        Err(Error::Render(_))
    ));
    assert!(session.viewer().state().outline().is_none());
}

#[tokio::test]
async fn test_open_flow_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReaderSession::new(write_library(dir.path()), Preferences::in_memory())
        .with_fetcher(Arc::new(BinaryFetcher))
        .with_backend(Arc::new(MockBackend));
    session.load_tree().await.unwrap();

    session.open("memo.docx").await.unwrap();
    let state = session.viewer().state();
    assert_eq!(state.zoom_scale(), Some(1.0));
    assert_eq!(state.outline().map(|o| o.total_items()), Some(1));
    assert!(session.prerender().await.is_err());
}

#[tokio::test]
async fn test_theme_persists() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Preferences::in_memory();
    let mut session = ReaderSession::new(write_library(dir.path()), prefs.clone());
    assert_eq!(session.theme(), &ThemeSelection::Preset(ThemePreset::Light));

    session.set_theme(ThemeSelection::Preset(ThemePreset::Sepia));
    let reopened = ReaderSession::new(write_library(dir.path()), prefs);
    assert_eq!(reopened.theme(), &ThemeSelection::Preset(ThemePreset::Sepia));
}
