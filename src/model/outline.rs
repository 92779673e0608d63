//! Outline (table of contents) types shared by every document kind.

use serde::{Deserialize, Serialize};

/// Where an outline node points inside its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionRef {
    /// A resolved page number (1-indexed) in a paginated document
    Page { page: u32 },

    /// An element of a markup or flow document
    Element {
        /// Element identifier the renderer scrolls to
        id: String,
        /// Index of the element in document order
        order: u32,
    },
}

impl PositionRef {
    /// Integer used to compare positions (page number or element order).
    pub fn ordinal(&self) -> u64 {
        match self {
            PositionRef::Page { page } => u64::from(*page),
            PositionRef::Element { order, .. } => u64::from(*order),
        }
    }

    /// Page number for page positions.
    pub fn page(&self) -> Option<u32> {
        match self {
            PositionRef::Page { page } => Some(*page),
            PositionRef::Element { .. } => None,
        }
    }

    /// Element identifier for element positions.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            PositionRef::Element { id, .. } => Some(id),
            PositionRef::Page { .. } => None,
        }
    }
}

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Identifier, unique within one outline
    pub id: String,

    /// Display title
    pub title: String,

    /// Heading level (1 = top level)
    pub level: u8,

    /// Target position
    pub position: PositionRef,

    /// Nested entries
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a childless outline node. Levels below 1 are raised to 1.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        level: u8,
        position: PositionRef,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            level: level.max(1),
            position,
            children: Vec::new(),
        }
    }

    /// Add a child node.
    pub fn add_child(&mut self, child: OutlineNode) {
        self.children.push(child);
    }

    /// Check if this node has children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A non-empty document outline.
///
/// Extraction returns `Option<Outline>`; `None` means the document has no
/// derivable headings or bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level outline items
    pub items: Vec<OutlineNode>,
}

impl Outline {
    /// Create an outline from root nodes.
    pub fn new(items: Vec<OutlineNode>) -> Self {
        Self { items }
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the total number of items (including nested).
    pub fn total_items(&self) -> usize {
        fn count_items(items: &[OutlineNode]) -> usize {
            items
                .iter()
                .map(|item| 1 + count_items(&item.children))
                .sum()
        }
        count_items(&self.items)
    }

    /// All nodes in pre-order (document order).
    pub fn flatten(&self) -> Vec<&OutlineNode> {
        fn walk<'a>(items: &'a [OutlineNode], out: &mut Vec<&'a OutlineNode>) {
            for item in items {
                out.push(item);
                walk(&item.children, out);
            }
        }
        let mut out = Vec::with_capacity(self.total_items());
        walk(&self.items, &mut out);
        out
    }

    /// Find a node by id.
    pub fn find(&self, id: &str) -> Option<&OutlineNode> {
        self.path_to(id).and_then(|path| path.last().copied())
    }

    /// The chain of nodes from a root down to the node with `id`, inclusive.
    pub fn path_to(&self, id: &str) -> Option<Vec<&OutlineNode>> {
        fn walk<'a>(items: &'a [OutlineNode], id: &str, trail: &mut Vec<&'a OutlineNode>) -> bool {
            for item in items {
                trail.push(item);
                if item.id == id || walk(&item.children, id, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }
        let mut trail = Vec::new();
        walk(&self.items, id, &mut trail).then_some(trail)
    }

    /// Ids of the ancestors of `id`, outermost first.
    pub fn ancestor_ids(&self, id: &str) -> Vec<String> {
        match self.path_to(id) {
            Some(path) => path[..path.len() - 1]
                .iter()
                .map(|n| n.id.clone())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, p: u32, level: u8) -> OutlineNode {
        OutlineNode::new(id, id.to_uppercase(), level, PositionRef::Page { page: p })
    }

    #[test]
    fn test_outline_queries() {
        let mut chapter1 = page("c1", 1, 1);
        let mut section = page("s11", 2, 2);
        section.add_child(page("s111", 3, 3));
        chapter1.add_child(section);
        chapter1.add_child(page("s12", 5, 2));
        let outline = Outline::new(vec![chapter1, page("c2", 9, 1)]);

        assert_eq!(outline.total_items(), 5);
        let order: Vec<_> = outline.flatten().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["c1", "s11", "s111", "s12", "c2"]);
        assert_eq!(outline.ancestor_ids("s111"), vec!["c1", "s11"]);
        assert!(outline.ancestor_ids("c2").is_empty());
        assert!(outline.find("nope").is_none());
    }

    #[test]
    fn test_level_floor() {
        let node = OutlineNode::new("x", "X", 0, PositionRef::Page { page: 1 });
        assert_eq!(node.level, 1);
    }

    #[test]
    fn test_position_ordinal() {
        assert_eq!(PositionRef::Page { page: 7 }.ordinal(), 7);
        let el = PositionRef::Element {
            id: "intro".into(),
            order: 12,
        };
        assert_eq!(el.ordinal(), 12);
        assert_eq!(el.element_id(), Some("intro"));
    }
}
