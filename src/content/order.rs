//! Sibling ordering and pruning for content trees.

use crate::model::ContentNode;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Collation key: compatibility-decomposed, accents stripped, lowercased.
fn collation_key(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-aware name comparison.
///
/// Case and accents only break ties, so `apple` < `Banana` < `cherry` and
/// `eclair` sorts right before `Éclair`.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Sibling order: folders before files, then by name.
pub fn compare_entries(a_is_dir: bool, a_name: &str, b_is_dir: bool, b_name: &str) -> Ordering {
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| compare_names(a_name, b_name))
}

/// Order and prune a node list recursively.
///
/// Folders left without any leaf are removed; siblings are sorted folders
/// first, then by name.
pub fn normalize(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let mut kept: Vec<ContentNode> = nodes
        .into_iter()
        .filter_map(|node| match node {
            ContentNode::Folder {
                name,
                path,
                children,
            } => {
                let children = normalize(children);
                if children.is_empty() {
                    log::debug!("Pruning empty folder {}", path);
                    None
                } else {
                    Some(ContentNode::Folder {
                        name,
                        path,
                        children,
                    })
                }
            }
            leaf => Some(leaf),
        })
        .collect();

    kept.sort_by(|a, b| compare_entries(a.is_folder(), a.name(), b.is_folder(), b.name()));
    kept
}
