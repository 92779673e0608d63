//! Document fetching.
//!
//! Markup documents are fetched as text. Paginated and flow documents are
//! binary payloads handed to the renderer by location, so fetching them only
//! resolves where they live.

use crate::config::{LibraryConfig, SourceMode};
use crate::content::encode_path;
use crate::error::{Error, Result};
use crate::model::DocumentKind;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where a document's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocation {
    /// Raw-content URL
    Url(String),
    /// File on the local filesystem
    File(PathBuf),
}

impl DocumentLocation {
    /// Location as a string the renderer can open.
    pub fn as_string(&self) -> String {
        match self {
            DocumentLocation::Url(url) => url.clone(),
            DocumentLocation::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// A fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedDocument {
    /// Markup source text
    Text(String),
    /// Binary payload the renderer loads from `url`
    Binary { kind: DocumentKind, url: String },
}

/// Maps leaf paths to document locations.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    mode: SourceMode,
    raw_base: String,
    owner: String,
    repo: String,
    branch: String,
    posts_path: String,
    posts_dir: PathBuf,
}

impl DocumentLocator {
    /// Create a locator from the library configuration.
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self {
            mode: config.source_mode(),
            raw_base: config.raw_base.trim_end_matches('/').to_string(),
            owner: config.github.owner.clone(),
            repo: config.github.repo.clone(),
            branch: config.github.branch.clone(),
            posts_path: config.github.posts_path.trim_matches('/').to_string(),
            posts_dir: config.posts_dir.clone(),
        }
    }

    /// Resolve a leaf path.
    pub fn locate(&self, path: &str) -> DocumentLocation {
        let path = path.trim_start_matches('/');
        match self.mode {
            SourceMode::Remote => {
                let mut url = format!(
                    "{}/{}/{}/{}",
                    self.raw_base,
                    urlencoding::encode(&self.owner),
                    urlencoding::encode(&self.repo),
                    encode_path(&self.branch)
                );
                if !self.posts_path.is_empty() {
                    url.push('/');
                    url.push_str(&encode_path(&self.posts_path));
                }
                url.push('/');
                url.push_str(&encode_path(path));
                DocumentLocation::Url(url)
            }
            SourceMode::Local => {
                let prefix = self
                    .posts_dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| format!("{}/", n));
                let relative = match prefix {
                    Some(p) => path.strip_prefix(p.as_str()).unwrap_or(path),
                    None => path,
                };
                DocumentLocation::File(self.posts_dir.join(relative))
            }
        }
    }
}

/// Fetches document content for a leaf.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `path`.
    async fn fetch(&self, path: &str, kind: DocumentKind) -> Result<FetchedDocument>;
}

/// Fetcher reading raw-content URLs over HTTP or files from disk.
pub struct DefaultFetcher {
    locator: DocumentLocator,
    client: reqwest::Client,
}

impl DefaultFetcher {
    /// Create a fetcher for the configured source.
    pub fn new(config: &LibraryConfig) -> Self {
        Self {
            locator: DocumentLocator::from_config(config),
            client: reqwest::Client::new(),
        }
    }

    /// The locator used to resolve paths.
    pub fn locator(&self) -> &DocumentLocator {
        &self.locator
    }

    async fn fetch_text(&self, location: &DocumentLocation) -> Result<String> {
        match location {
            DocumentLocation::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .header(
                        reqwest::header::USER_AGENT,
                        concat!("folio/", env!("CARGO_PKG_VERSION")),
                    )
                    .send()
                    .await
                    .map_err(|e| Error::DocumentNotFound(format!("{}: {}", url, e)))?;
                if !response.status().is_success() {
                    return Err(Error::DocumentNotFound(format!(
                        "{}: HTTP {}",
                        url,
                        response.status()
                    )));
                }
                response
                    .text()
                    .await
                    .map_err(|e| Error::DocumentNotFound(format!("{}: {}", url, e)))
            }
            DocumentLocation::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Error::DocumentNotFound(format!("{}: {}", path.display(), e))),
        }
    }
}

#[async_trait]
impl DocumentFetcher for DefaultFetcher {
    async fn fetch(&self, path: &str, kind: DocumentKind) -> Result<FetchedDocument> {
        let location = self.locator.locate(path);
        log::debug!("Fetching {} document {}", kind, location.as_string());

        match kind {
            DocumentKind::Markup => self.fetch_text(&location).await.map(FetchedDocument::Text),
            DocumentKind::Paginated | DocumentKind::Flow => {
                if let DocumentLocation::File(file) = &location {
                    tokio::fs::metadata(file).await.map_err(|e| {
                        Error::DocumentNotFound(format!("{}: {}", file.display(), e))
                    })?;
                }
                Ok(FetchedDocument::Binary {
                    kind,
                    url: location.as_string(),
                })
            }
        }
    }
}
