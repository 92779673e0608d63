//! # folio
//!
//! Navigation core for a personal document library.
//!
//! This library indexes a library of Markdown, PDF and DOCX documents, derives
//! a uniform outline (table of contents) for each document kind, and keeps
//! the outline in sync with the reader's scroll position.
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{LibraryConfig, Preferences, ReaderSession};
//!
//! # async fn run() -> folio::Result<()> {
//! let config = LibraryConfig::load("folio.json")?;
//! let mut session = ReaderSession::new(config, Preferences::in_memory());
//!
//! // Build the content index
//! let tree = session.load_tree().await?;
//! println!("{} documents", tree.leaf_count());
//!
//! // Open a document and walk its outline
//! session.open("guides/intro.md").await?;
//! if let Some(outline) = session.viewer().state().outline() {
//!     println!("{} headings", outline.total_items());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Two content sources**: local manifest or GitHub directory listing, with cached fallback
//! - **One outline shape**: markdown headings, PDF bookmarks and inferred DOCX headings
//! - **Scroll sync**: greatest-lower-bound highlight with throttled sampling
//! - **Viewer state machine**: paging, zoom and view modes as explicit transitions
//! - **Renderer-agnostic**: PDF and DOCX rendering stay behind traits

pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod model;
pub mod outline;
pub mod prefs;
pub mod session;
pub mod sync;
pub mod viewer;

// Re-export commonly used types
pub use backend::{Bookmark, Destination, DocumentBackend, PageTarget, PaginatedDocument};
pub use config::{GithubConfig, LibraryConfig, SourceMode};
pub use content::{ContentSource, ContentTreeLoader, DirectoryListing, GithubListing};
pub use error::{Error, Result};
pub use fetch::{DefaultFetcher, DocumentFetcher, FetchedDocument};
pub use model::{
    Block, BlockStyle, ContentNode, ContentTree, DocumentKind, Outline, OutlineNode, PositionRef,
};
pub use outline::{nest, DocumentHandle, HeadingPolicy, MarkupSource, OutlineExtractor};
pub use prefs::{Preferences, ThemePreset, ThemeSelection};
pub use session::{OpenedDocument, ReaderSession};
pub use sync::{select_current, HighlightUpdate, ViewportSync};
pub use viewer::{
    DocumentToken, RenderRequest, Transition, ViewMode, ViewerState, ViewerStateMachine,
};

/// Extract the outline of a markdown document.
///
/// # Example
///
/// ```
/// let outline = folio::markdown_outline("# Intro\n## Setup").unwrap();
/// assert_eq!(outline.total_items(), 2);
/// ```
pub fn markdown_outline(text: &str) -> Option<Outline> {
    let nodes = nest(outline::markdown_headings(text));
    (!nodes.is_empty()).then(|| Outline::new(nodes))
}
