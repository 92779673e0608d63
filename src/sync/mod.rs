//! Viewport to outline synchronization.
//!
//! Maps the reader's position to the outline node that represents it and
//! describes the resulting highlight as a plain [`HighlightUpdate`] value.

mod throttle;
mod viewport;

pub use throttle::{Throttle, DEFAULT_INTERVAL};
pub use viewport::{heading_geometry, nearest_block, BlockGeometry, Viewport};

use crate::model::{Outline, OutlineNode};
use std::time::Instant;

/// Select the node for a position by greatest lower bound.
///
/// Among nodes whose ordinal does not exceed `position`, the one with the
/// largest ordinal wins; on equal ordinals the later node in document order
/// wins. Returns `None` when every node lies after `position`.
pub fn select_current(outline: &Outline, position: u64) -> Option<&OutlineNode> {
    let mut best: Option<&OutlineNode> = None;
    for node in outline.flatten() {
        let ordinal = node.position.ordinal();
        if ordinal > position {
            continue;
        }
        if best.map_or(true, |b| ordinal >= b.position.ordinal()) {
            best = Some(node);
        }
    }
    best
}

/// Outline highlight effects for one position update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightUpdate {
    /// The single highlighted node, if any
    pub highlighted: Option<String>,

    /// Ancestors of the highlighted node to expand, outermost first
    pub expanded: Vec<String>,

    /// Whether the highlight moved; only then is the node revealed in the panel
    pub changed: bool,
}

impl HighlightUpdate {
    /// Compute the highlight for a position.
    pub fn compute(outline: &Outline, position: u64, previous: Option<&str>) -> Self {
        match select_current(outline, position) {
            Some(node) => Self::for_node(outline, &node.id, previous),
            None => Self::cleared(previous),
        }
    }

    /// Highlight a specific node.
    pub fn for_node(outline: &Outline, id: &str, previous: Option<&str>) -> Self {
        Self {
            highlighted: Some(id.to_string()),
            expanded: outline.ancestor_ids(id),
            changed: previous != Some(id),
        }
    }

    /// An update clearing any highlight.
    pub fn cleared(previous: Option<&str>) -> Self {
        Self {
            highlighted: None,
            expanded: Vec::new(),
            changed: previous.is_some(),
        }
    }
}

/// Turns raw scroll samples into positions and highlights.
#[derive(Debug, Clone, Default)]
pub struct ViewportSync {
    throttle: Throttle,
}

impl ViewportSync {
    /// Create a sync with a custom sampling throttle.
    pub fn new(throttle: Throttle) -> Self {
        Self { throttle }
    }

    /// Sample the scroll position.
    ///
    /// Returns the ordinal of the block nearest the viewport center, or
    /// `None` when the sample is throttled or there are no blocks.
    pub fn sample(
        &mut self,
        now: Instant,
        blocks: &[BlockGeometry],
        viewport: Viewport,
    ) -> Option<u64> {
        if !self.throttle.ready(now) {
            return None;
        }
        nearest_block(blocks, viewport).map(|b| b.ordinal)
    }

    /// Recompute the highlight for a position.
    pub fn refresh(
        &self,
        outline: Option<&Outline>,
        position: u64,
        previous: Option<&str>,
    ) -> HighlightUpdate {
        match outline {
            Some(outline) => HighlightUpdate::compute(outline, position, previous),
            None => HighlightUpdate::cleared(previous),
        }
    }

    /// Start over for a new document.
    pub fn reset(&mut self) {
        self.throttle.reset();
    }
}
