//! Content index loading.
//!
//! A [`ContentTreeLoader`] builds the [`ContentTree`] from one of two sources:
//!
//! - a pre-built JSON manifest on disk ([`LocalManifest`])
//! - a remote directory listing walked recursively ([`RemoteSource`])
//!
//! A successful remote load is snapshotted into the preference store. When the
//! remote source later fails, the snapshot is served instead.

mod local;
mod order;
mod remote;

pub use local::{parse_manifest, LocalManifest};
pub use order::{compare_entries, compare_names, normalize};
pub use remote::{
    fetch_tree, next_page_url, DirectoryListing, EntryKind, GithubListing, ListingEntry,
};

pub(crate) use remote::encode_path;

use crate::config::{LibraryConfig, SourceMode};
use crate::error::{Error, Result};
use crate::model::ContentTree;
use crate::prefs::Preferences;
use chrono::Utc;

/// A remote listing rooted at a directory of the repository.
pub struct RemoteSource {
    listing: Box<dyn DirectoryListing>,
    root: String,
}

impl RemoteSource {
    /// Create a remote source walking `root` through `listing`.
    pub fn new(listing: Box<dyn DirectoryListing>, root: impl Into<String>) -> Self {
        Self {
            listing,
            root: root.into(),
        }
    }

    /// Root directory of the walk.
    pub fn root(&self) -> &str {
        &self.root
    }
}

/// Where the content tree comes from.
pub enum ContentSource {
    /// Pre-built manifest
    Local(LocalManifest),
    /// Recursive remote listing
    Remote(RemoteSource),
}

/// Loads the content tree, maintaining the cached snapshot.
pub struct ContentTreeLoader {
    source: ContentSource,
    prefs: Preferences,
}

impl ContentTreeLoader {
    /// Create a loader for a source.
    pub fn new(source: ContentSource, prefs: Preferences) -> Self {
        Self { source, prefs }
    }

    /// Create a loader for the source selected by the configuration.
    pub fn from_config(config: &LibraryConfig, prefs: Preferences) -> Self {
        let source = match config.source_mode() {
            SourceMode::Remote => ContentSource::Remote(RemoteSource::new(
                Box::new(GithubListing::new(config.api_base.clone(), &config.github)),
                config.github.posts_path.clone(),
            )),
            SourceMode::Local => ContentSource::Local(LocalManifest::new(&config.manifest_path)),
        };
        Self::new(source, prefs)
    }

    /// The configured source.
    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Load the content tree.
    ///
    /// Remote failures fall back to the cached snapshot; without one the
    /// load fails with [`Error::SourceUnavailable`].
    pub async fn load(&self) -> Result<ContentTree> {
        match &self.source {
            ContentSource::Local(manifest) => manifest.load().await,
            ContentSource::Remote(remote) => self.load_remote(remote).await,
        }
    }

    async fn load_remote(&self, remote: &RemoteSource) -> Result<ContentTree> {
        match fetch_tree(remote.listing.as_ref(), &remote.root).await {
            Ok(nodes) => {
                let tree = ContentTree::new(nodes);
                log::info!("Fetched content tree ({} documents)", tree.leaf_count());
                if let Err(e) = self.prefs.store_tree(&tree, Utc::now()) {
                    log::warn!("Failed to cache content tree: {}", e);
                }
                Ok(tree)
            }
            Err(e) => match self.prefs.cached_tree() {
                Some(snapshot) => {
                    match snapshot.fetched_at {
                        Some(at) => log::warn!(
                            "Remote listing failed ({}); using cached tree from {}",
                            e,
                            at.to_rfc3339()
                        ),
                        None => log::warn!("Remote listing failed ({}); using cached tree", e),
                    }
                    Ok(snapshot.tree)
                }
                None => Err(Error::SourceUnavailable(format!(
                    "remote listing failed and no cached tree exists: {}",
                    e
                ))),
            },
        }
    }
}
