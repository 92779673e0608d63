//! Error types for the folio library.

use std::io;
use thiserror::Error;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, opening and navigating documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON in a manifest, listing or preference value.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Neither the live source nor a cached snapshot produced a content tree.
    #[error("Content source unavailable: {0}")]
    SourceUnavailable(String),

    /// The selected document could not be fetched.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// A single bookmark destination could not be resolved to a page.
    #[error("Destination could not be resolved: {0}")]
    DestinationResolution(String),

    /// Navigation target outside the valid page range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    OutOfRange(u32, u32),

    /// The operation does not apply to the open document kind.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// No outline node carries the given id.
    #[error("Unknown outline node: {0}")]
    UnknownOutlineNode(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The external renderer reported a failure.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
