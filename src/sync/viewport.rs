//! Scroll geometry.

use crate::model::Outline;

/// Layout of one rendered block (or page) inside the scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockGeometry {
    /// Position ordinal of the block (page number or element order)
    pub ordinal: u64,
    /// Offset of the block's top edge from the container top
    pub top: f32,
    /// Block height
    pub height: f32,
}

impl BlockGeometry {
    pub fn new(ordinal: u64, top: f32, height: f32) -> Self {
        Self {
            ordinal,
            top,
            height,
        }
    }

    fn center(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// The visible window of the scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(scroll_top: f32, height: f32) -> Self {
        Self { scroll_top, height }
    }

    fn center(&self) -> f32 {
        self.scroll_top + self.height / 2.0
    }
}

/// The block whose vertical center is closest to the viewport center.
///
/// Ties go to the earlier block.
pub fn nearest_block(blocks: &[BlockGeometry], viewport: Viewport) -> Option<&BlockGeometry> {
    let center = viewport.center();
    let mut best: Option<(&BlockGeometry, f32)> = None;
    for block in blocks {
        let distance = (block.center() - center).abs();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((block, distance)),
        }
    }
    best.map(|(block, _)| block)
}

/// Geometry for rendered heading elements, keyed by element id.
///
/// Each heading takes the ordinal of the outline node with the same id, so
/// samples land in the ordinal space the outline was built in (source lines
/// for raw markdown). Ids unknown to the outline are skipped.
pub fn heading_geometry<'a, I>(outline: &Outline, headings: I) -> Vec<BlockGeometry>
where
    I: IntoIterator<Item = (&'a str, f32, f32)>,
{
    headings
        .into_iter()
        .filter_map(|(id, top, height)| {
            outline
                .find(id)
                .map(|node| BlockGeometry::new(node.position.ordinal(), top, height))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OutlineNode, PositionRef};

    #[test]
    fn test_heading_geometry_uses_outline_ordinals() {
        let outline = Outline::new(vec![
            OutlineNode::new("a", "A", 1, PositionRef::Element { id: "a".into(), order: 0 }),
            OutlineNode::new("b", "B", 1, PositionRef::Element { id: "b".into(), order: 4 }),
        ]);
        let geometry = heading_geometry(
            &outline,
            [("a", 0.0, 40.0), ("stray", 100.0, 20.0), ("b", 600.0, 40.0)],
        );
        let ordinals: Vec<_> = geometry.iter().map(|g| g.ordinal).collect();
        assert_eq!(ordinals, vec![0, 4]);
    }

    #[test]
    fn test_nearest_block() {
        let pages = [
            BlockGeometry::new(1, 0.0, 1000.0),
            BlockGeometry::new(2, 1000.0, 1000.0),
            BlockGeometry::new(3, 2000.0, 1000.0),
        ];
        let hit = nearest_block(&pages, Viewport::new(900.0, 800.0)).unwrap();
        assert_eq!(hit.ordinal, 2);
        let hit = nearest_block(&pages, Viewport::new(0.0, 800.0)).unwrap();
        assert_eq!(hit.ordinal, 1);
        assert!(nearest_block(&[], Viewport::new(0.0, 800.0)).is_none());
    }

    #[test]
    fn test_tie_prefers_earlier() {
        let blocks = [BlockGeometry::new(1, 0.0, 100.0), BlockGeometry::new(2, 200.0, 100.0)];
        let hit = nearest_block(&blocks, Viewport::new(0.0, 300.0)).unwrap();
        assert_eq!(hit.ordinal, 1);
    }
}
