//! Data model shared by the loader, extractors and viewer.
//!
//! The content tree is built once per load cycle and replaced wholesale on
//! reload. Outlines are rebuilt every time a document is opened.

mod block;
mod content;
mod outline;

pub use block::{Block, BlockStyle};
pub use content::{ContentNode, ContentTree, DocumentKind};
pub use outline::{Outline, OutlineNode, PositionRef};
