//! Content index types.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The kind of an openable document, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Structured markup (Markdown) with explicit headings
    #[serde(rename = "markdown", alias = "markup")]
    Markup,

    /// Paginated binary document (PDF) with an embedded bookmark list
    #[serde(rename = "pdf", alias = "paginated")]
    Paginated,

    /// Flow-reformatted office document (DOCX) without heading markup
    #[serde(rename = "word", alias = "flow")]
    Flow,
}

impl DocumentKind {
    /// Map a file name to a document kind.
    ///
    /// Returns `None` for files that are not openable documents.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Map an extension (without the leading dot) to a document kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(DocumentKind::Markup),
            "pdf" => Some(DocumentKind::Paginated),
            "docx" => Some(DocumentKind::Flow),
            _ => None,
        }
    }

    /// Display title for a file name: the name without its document extension.
    pub fn title_of(name: &str) -> String {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && Self::from_extension(ext).is_some() => {
                stem.to_string()
            }
            _ => name.to_string(),
        }
    }

    /// Short lowercase label used in logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Markup => "markdown",
            DocumentKind::Paginated => "pdf",
            DocumentKind::Flow => "word",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A node of the content index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    /// A directory with at least one leaf below it
    Folder {
        name: String,
        path: String,
        children: Vec<ContentNode>,
    },

    /// A single openable document
    #[serde(rename = "file")]
    Leaf {
        name: String,
        title: String,
        path: String,
        #[serde(rename = "fileType")]
        kind: DocumentKind,
    },
}

impl ContentNode {
    /// Create a folder node.
    pub fn folder(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<ContentNode>,
    ) -> Self {
        ContentNode::Folder {
            name: name.into(),
            path: path.into(),
            children,
        }
    }

    /// Create a leaf node, deriving its title from the file name.
    pub fn leaf(name: impl Into<String>, path: impl Into<String>, kind: DocumentKind) -> Self {
        let name = name.into();
        ContentNode::Leaf {
            title: DocumentKind::title_of(&name),
            name,
            path: path.into(),
            kind,
        }
    }

    /// Node name (last path segment).
    pub fn name(&self) -> &str {
        match self {
            ContentNode::Folder { name, .. } | ContentNode::Leaf { name, .. } => name,
        }
    }

    /// Node path relative to the content root.
    pub fn path(&self) -> &str {
        match self {
            ContentNode::Folder { path, .. } | ContentNode::Leaf { path, .. } => path,
        }
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, ContentNode::Folder { .. })
    }

    /// Document kind of a leaf, `None` for folders.
    pub fn kind(&self) -> Option<DocumentKind> {
        match self {
            ContentNode::Leaf { kind, .. } => Some(*kind),
            ContentNode::Folder { .. } => None,
        }
    }

    /// Children of a folder (empty for leaves).
    pub fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::Folder { children, .. } => children,
            ContentNode::Leaf { .. } => &[],
        }
    }

    /// Number of leaves at or below this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            ContentNode::Leaf { .. } => 1,
            ContentNode::Folder { children, .. } => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }
}

/// The hierarchical content index produced by one load cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTree {
    /// Top-level nodes in display order
    pub nodes: Vec<ContentNode>,
}

impl ContentTree {
    /// Wrap an already ordered node sequence.
    pub fn new(nodes: Vec<ContentNode>) -> Self {
        Self { nodes }
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().map(|n| n.leaf_count()).sum()
    }

    /// Find a node by its path.
    pub fn find(&self, path: &str) -> Option<&ContentNode> {
        fn walk<'a>(nodes: &'a [ContentNode], path: &str) -> Option<&'a ContentNode> {
            for node in nodes {
                if node.path() == path {
                    return Some(node);
                }
                if let ContentNode::Folder { children, .. } = node {
                    if let Some(found) = walk(children, path) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&self.nodes, path.trim_start_matches('/'))
    }

    /// All leaves in display order.
    pub fn leaves(&self) -> Vec<&ContentNode> {
        fn collect<'a>(nodes: &'a [ContentNode], out: &mut Vec<&'a ContentNode>) {
            for node in nodes {
                match node {
                    ContentNode::Leaf { .. } => out.push(node),
                    ContentNode::Folder { children, .. } => collect(children, out),
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }

    /// Paths of the folders enclosing `path`, outermost first.
    ///
    /// Used to expand the index down to the active leaf. Returns an empty
    /// list for top-level nodes and for paths not present in the tree.
    pub fn ancestor_folders(&self, path: &str) -> Vec<String> {
        fn walk(nodes: &[ContentNode], path: &str, trail: &mut Vec<String>) -> bool {
            for node in nodes {
                if node.path() == path {
                    return true;
                }
                if let ContentNode::Folder {
                    path: folder_path,
                    children,
                    ..
                } = node
                {
                    trail.push(folder_path.clone());
                    if walk(children, path, trail) {
                        return true;
                    }
                    trail.pop();
                }
            }
            false
        }
        let mut trail = Vec::new();
        if walk(&self.nodes, path.trim_start_matches('/'), &mut trail) {
            trail
        } else {
            Vec::new()
        }
    }
}
