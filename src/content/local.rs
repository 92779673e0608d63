//! Local manifest source.

use super::order::normalize;
use crate::error::{Error, Result};
use crate::model::{ContentNode, ContentTree};
use std::path::{Path, PathBuf};

/// A pre-built JSON manifest describing the content tree.
#[derive(Debug, Clone)]
pub struct LocalManifest {
    path: PathBuf,
}

impl LocalManifest {
    /// Create a manifest source for a file path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Manifest location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and normalize the manifest.
    pub async fn load(&self) -> Result<ContentTree> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::SourceUnavailable(format!("manifest {}: {}", self.path.display(), e))
        })?;
        let tree = parse_manifest(&text).map_err(|e| {
            Error::SourceUnavailable(format!("manifest {}: {}", self.path.display(), e))
        })?;
        log::debug!(
            "Loaded manifest {} ({} documents)",
            self.path.display(),
            tree.leaf_count()
        );
        Ok(tree)
    }
}

/// Parse manifest JSON into an ordered, pruned tree.
pub fn parse_manifest(text: &str) -> Result<ContentTree> {
    let nodes: Vec<ContentNode> = serde_json::from_str(text)?;
    Ok(ContentTree::new(normalize(nodes)))
}
