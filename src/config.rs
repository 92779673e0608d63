//! Library configuration.
//!
//! Loaded from a JSON file with camelCase keys; every field has a default so
//! a partial file (or none at all) is valid:
//!
//! ```json
//! {
//!   "title": "Notes",
//!   "github": { "owner": "me", "repo": "notes", "branch": "main", "postsPath": "posts" },
//!   "useGithubApi": true
//! }
//! ```

use crate::error::{Error, Result};
use crate::outline::HeadingPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default raw-content endpoint.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Remote repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GithubConfig {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch to read
    pub branch: String,

    /// Directory inside the repository holding the documents
    pub posts_path: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            posts_path: "posts".to_string(),
        }
    }
}

impl GithubConfig {
    /// Check that owner and repository are set.
    pub fn is_complete(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }
}

/// Which backing store the content index is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Pre-built manifest file
    Local,
    /// Recursive remote directory listing
    Remote,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LibraryConfig {
    /// Library title
    pub title: String,

    /// Remote repository coordinates
    pub github: GithubConfig,

    /// Load the index from the remote listing instead of the manifest
    pub use_github_api: bool,

    /// Path of the pre-built manifest
    pub manifest_path: PathBuf,

    /// Local directory that manifest paths are relative to
    pub posts_dir: PathBuf,

    /// Base URL of the listing API
    pub api_base: String,

    /// Base URL of raw document content
    pub raw_base: String,

    /// Heading detection thresholds for flow documents
    pub headings: HeadingPolicy,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
            github: GithubConfig::default(),
            use_github_api: false,
            manifest_path: PathBuf::from("posts.json"),
            posts_dir: PathBuf::from("posts"),
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            headings: HeadingPolicy::default(),
        }
    }
}

impl LibraryConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!(
            "Loaded configuration from {} (source: {:?})",
            path.display(),
            config.source_mode()
        );
        Ok(config)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.use_github_api && self.github.branch.trim().is_empty() {
            return Err(Error::Config("github.branch must not be empty".into()));
        }
        self.headings.validate()
    }

    /// Effective source mode.
    ///
    /// The remote listing is used only when it is enabled and the repository
    /// coordinates are complete; anything else falls back to the manifest.
    pub fn source_mode(&self) -> SourceMode {
        if self.use_github_api && self.github.is_complete() {
            SourceMode::Remote
        } else {
            SourceMode::Local
        }
    }

    /// Set the remote repository and enable remote mode.
    pub fn with_github(
        mut self,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        self.github.owner = owner.into();
        self.github.repo = repo.into();
        self.github.branch = branch.into();
        self.use_github_api = true;
        self
    }

    /// Set the directory inside the repository that holds documents.
    pub fn with_posts_path(mut self, posts_path: impl Into<String>) -> Self {
        self.github.posts_path = posts_path.into();
        self
    }

    /// Set the manifest path.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Set the local documents directory.
    pub fn with_posts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.posts_dir = dir.into();
        self
    }

    /// Override the API and raw-content base URLs.
    pub fn with_endpoints(mut self, api_base: impl Into<String>, raw_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.raw_base = raw_base.into();
        self
    }

    /// Set the flow heading policy.
    pub fn with_headings(mut self, policy: HeadingPolicy) -> Self {
        self.headings = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_local() {
        let config = LibraryConfig::default();
        assert_eq!(config.source_mode(), SourceMode::Local);
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.github.posts_path, "posts");
    }

    #[test]
    fn test_remote_requires_coordinates() {
        let config = LibraryConfig::from_json_str(r#"{"useGithubApi": true}"#).unwrap();
        assert_eq!(config.source_mode(), SourceMode::Local);

        let config = LibraryConfig::new().with_github("me", "notes", "main");
        assert_eq!(config.source_mode(), SourceMode::Remote);
    }

    #[test]
    fn test_partial_json() {
        let config = LibraryConfig::from_json_str(
            r#"{"title": "CY", "github": {"owner": "cy", "repo": "blog"}, "useGithubApi": true}"#,
        )
        .unwrap();
        assert_eq!(config.title, "CY");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.source_mode(), SourceMode::Remote);
        assert_eq!(config.headings, HeadingPolicy::default());
    }

    #[test]
    fn test_empty_branch_rejected() {
        let result = LibraryConfig::from_json_str(
            r#"{"github": {"owner": "a", "repo": "b", "branch": ""}, "useGithubApi": true}"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
