//! Remote directory listing source.
//!
//! The tree is built by walking the listing depth-first, one directory level
//! per request. Each level is sorted before recursing so sibling order does not
//! depend on the order the backing store returns entries in.

use super::order::compare_entries;
use crate::config::GithubConfig;
use crate::error::{Error, Result};
use crate::model::{ContentNode, DocumentKind};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Whether a listing entry is a directory or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A directory
    Dir,
    /// A regular file
    File,
    /// Symlinks, submodules and anything else
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingEntry {
    /// Entry name
    pub name: String,

    /// Full path inside the repository
    pub path: String,

    /// Entry kind
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl ListingEntry {
    /// Create a directory entry.
    pub fn dir(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Dir,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A remote directory listing API.
#[async_trait]
pub trait DirectoryListing: Send + Sync {
    /// List the direct entries of a repository directory.
    async fn list(&self, dir: &str) -> Result<Vec<ListingEntry>>;
}

/// Listing backed by the GitHub contents API.
pub struct GithubListing {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
}

impl GithubListing {
    /// Create a listing client for a repository.
    pub fn new(api_base: impl Into<String>, github: &GithubConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            owner: github.owner.clone(),
            repo: github.repo.clone(),
            branch: github.branch.clone(),
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// URL of the first listing page for `dir`.
    pub fn listing_url(&self, dir: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo),
            encode_path(dir),
            urlencoding::encode(&self.branch)
        )
    }
}

#[async_trait]
impl DirectoryListing for GithubListing {
    async fn list(&self, dir: &str) -> Result<Vec<ListingEntry>> {
        let mut entries = Vec::new();
        let mut next = Some(self.listing_url(dir));

        while let Some(url) = next.take() {
            log::debug!("Fetching listing page {}", url);
            let response = self
                .client
                .get(&url)
                .header(reqwest::header::USER_AGENT, concat!("folio/", env!("CARGO_PKG_VERSION")))
                .header(reqwest::header::ACCEPT, "application/vnd.github+json")
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(Error::SourceUnavailable(format!(
                    "listing {} returned {}",
                    dir,
                    response.status()
                )));
            }

            next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<ListingEntry> = response.json().await?;
            entries.extend(page);
        }

        Ok(entries)
    }
}

/// Percent-encode each segment of a `/`-separated path.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extract the `rel="next"` target from a `Link` header.
pub fn next_page_url(link: &str) -> Option<String> {
    static NEXT: OnceLock<Regex> = OnceLock::new();
    let re = NEXT.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel="?next"?"#).expect("valid link pattern")
    });
    re.captures(link).map(|c| c[1].to_string())
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Walk the listing below `root` and build the content tree.
///
/// Node paths are relative to `root`. Folders without eligible leaves are
/// dropped and files with unsupported extensions are skipped.
pub async fn fetch_tree<L>(listing: &L, root: &str) -> Result<Vec<ContentNode>>
where
    L: DirectoryListing + ?Sized,
{
    let root = root.trim_matches('/');
    fetch_level(listing, root.to_string(), String::new()).await
}

fn fetch_level<'a, L>(
    listing: &'a L,
    dir: String,
    base: String,
) -> BoxFuture<'a, Result<Vec<ContentNode>>>
where
    L: DirectoryListing + ?Sized,
{
    async move {
        let mut entries = listing.list(&dir).await?;
        entries.sort_by(|a, b| compare_entries(a.is_dir(), &a.name, b.is_dir(), &b.name));

        let mut nodes = Vec::new();
        for entry in entries {
            let path = join_path(&base, &entry.name);
            match entry.kind {
                EntryKind::Dir => {
                    let children = fetch_level(listing, entry.path.clone(), path.clone()).await?;
                    if children.is_empty() {
                        log::debug!("Dropping folder {} with no documents", path);
                    } else {
                        nodes.push(ContentNode::folder(entry.name, path, children));
                    }
                }
                EntryKind::File => {
                    if let Some(kind) = DocumentKind::from_file_name(&entry.name) {
                        nodes.push(ContentNode::leaf(entry.name, path, kind));
                    }
                }
                EntryKind::Other => {}
            }
        }
        Ok(nodes)
    }
    .boxed()
}
