//! Heading inference for flow documents.
//!
//! Converted office documents rarely keep heading markup, so headings are
//! guessed from the rendered blocks. Three rules are tried in order and the
//! first one yielding any candidate wins:
//!
//! 1. native `h1`..`h6` blocks
//! 2. short `p`/`div` blocks with a heading signal (bold, heading-like class,
//!    heavy weight or large font)
//! 3. blocks noticeably larger than the mean font size, or short heavy blocks

use super::UniqueIds;
use crate::error::{Error, Result};
use crate::model::{Block, OutlineNode, PositionRef};
use serde::{Deserialize, Serialize};

/// Thresholds for flow heading inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeadingPolicy {
    /// Blocks must be shorter than this (in characters) to count as a heading
    pub max_heading_chars: usize,

    /// Computed font weight treated as bold
    pub bold_weight: u16,

    /// Font size (px) treated as a heading signal
    pub large_font_px: f32,

    /// Blocks considered by the relative-size rule must be shorter than this
    pub max_block_chars: usize,

    /// A block is large when its font size exceeds the mean by this factor
    pub relative_margin: f32,

    /// Font size lower bounds for levels 1, 2 and 3; smaller text is level 4
    pub level_bands: [f32; 3],

    /// Class name fragments marking a heading
    pub class_hints: Vec<String>,
}

impl Default for HeadingPolicy {
    fn default() -> Self {
        Self {
            max_heading_chars: 100,
            bold_weight: 600,
            large_font_px: 18.0,
            max_block_chars: 200,
            relative_margin: 1.15,
            level_bands: [24.0, 20.0, 18.0],
            class_hints: vec!["heading".to_string(), "title".to_string()],
        }
    }
}

impl HeadingPolicy {
    /// Create a policy with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading length.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    /// Set the bold weight threshold.
    pub fn with_bold_weight(mut self, weight: u16) -> Self {
        self.bold_weight = weight;
        self
    }

    /// Set the relative size margin.
    pub fn with_relative_margin(mut self, margin: f32) -> Self {
        self.relative_margin = margin;
        self
    }

    /// Check that the thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_heading_chars == 0 || self.max_block_chars == 0 {
            return Err(Error::Config("heading length limits must be positive".into()));
        }
        if !(self.relative_margin.is_finite() && self.relative_margin > 0.0) {
            return Err(Error::Config(format!(
                "relative margin must be positive, got {}",
                self.relative_margin
            )));
        }
        let [l1, l2, l3] = self.level_bands;
        if !(l1 >= l2 && l2 >= l3) {
            return Err(Error::Config(
                "level bands must be in descending order".into(),
            ));
        }
        Ok(())
    }

    /// Level for a font size.
    pub fn level_for_size(&self, size: Option<f32>) -> u8 {
        let Some(size) = size else {
            return 4;
        };
        let [l1, l2, l3] = self.level_bands;
        if size >= l1 {
            1
        } else if size >= l2 {
            2
        } else if size >= l3 {
            3
        } else {
            4
        }
    }

    fn has_class_hint(&self, block: &Block) -> bool {
        let class = block.class_name.to_lowercase();
        self.class_hints
            .iter()
            .any(|hint| !hint.is_empty() && class.contains(&hint.to_lowercase()))
    }

    fn is_heavy(&self, block: &Block) -> bool {
        block.style.font_weight.is_some_and(|w| w >= self.bold_weight)
    }

    fn has_signal(&self, block: &Block) -> bool {
        block.style.inline_bold
            || self.has_class_hint(block)
            || self.is_heavy(block)
            || block.style.font_size.is_some_and(|s| s >= self.large_font_px)
    }
}

fn is_text_block(block: &Block) -> bool {
    matches!(block.tag.as_str(), "p" | "div") && !block.trimmed_text().is_empty()
}

/// Pick heading candidates as `(block index, level)` pairs.
fn candidates(blocks: &[Block], policy: &HeadingPolicy) -> Vec<(usize, u8)> {
    let native: Vec<(usize, u8)> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.trimmed_text().is_empty())
        .filter_map(|(i, b)| b.heading_rank().map(|rank| (i, rank)))
        .collect();
    if !native.is_empty() {
        log::debug!("Flow outline from {} native headings", native.len());
        return native;
    }

    let signalled: Vec<(usize, u8)> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            is_text_block(b) && b.text_len() < policy.max_heading_chars && policy.has_signal(b)
        })
        .map(|(i, b)| (i, policy.level_for_size(b.style.font_size)))
        .collect();
    if !signalled.is_empty() {
        log::debug!("Flow outline from {} styled blocks", signalled.len());
        return signalled;
    }

    let pool: Vec<(usize, &Block)> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| is_text_block(b) && b.text_len() < policy.max_block_chars)
        .collect();
    let sizes: Vec<f32> = pool.iter().filter_map(|(_, b)| b.style.font_size).collect();
    let mean = if sizes.is_empty() {
        None
    } else {
        Some(sizes.iter().sum::<f32>() / sizes.len() as f32)
    };

    pool.into_iter()
        .filter(|(_, b)| {
            let large = match (b.style.font_size, mean) {
                (Some(size), Some(mean)) => size > mean * policy.relative_margin,
                _ => false,
            };
            large || (policy.is_heavy(b) && b.text_len() < policy.max_heading_chars)
        })
        .map(|(i, b)| (i, policy.level_for_size(b.style.font_size)))
        .collect()
}

/// Infer flat headings from flow blocks, in document order.
pub(crate) fn headings(blocks: &[Block], policy: &HeadingPolicy) -> Vec<OutlineNode> {
    let found = candidates(blocks, policy);
    let mut ids = UniqueIds::default();
    for (index, _) in &found {
        if let Some(id) = &blocks[*index].id {
            ids.reserve(id);
        }
    }

    found
        .into_iter()
        .enumerate()
        .map(|(n, (index, level))| {
            let block = &blocks[index];
            let id = match &block.id {
                Some(id) => id.clone(),
                None => ids.allocate(format!("flow-heading-{}", n)),
            };
            OutlineNode::new(
                id.clone(),
                block.trimmed_text(),
                level,
                PositionRef::Element {
                    id,
                    order: index as u32,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(nodes: &[OutlineNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn test_native_headings_win() {
        let blocks = vec![
            Block::paragraph("Bold lead").bold(),
            Block::heading(2, "Real"),
            Block::paragraph("body"),
        ];
        let nodes = headings(&blocks, &HeadingPolicy::default());
        assert_eq!(titles(&nodes), vec!["Real"]);
        assert_eq!(nodes[0].level, 2);
        assert_eq!(nodes[0].position.ordinal(), 1);
        assert_eq!(nodes[0].id, "flow-heading-0");
    }

    #[test]
    fn test_signal_rule() {
        let long = "x".repeat(150);
        let blocks = vec![
            Block::paragraph("Intro").with_font_size(26.0).bold(),
            Block::paragraph(long).bold(),
            Block::new("div", "Chapter").with_class("DocTitle"),
            Block::paragraph("Heavy").with_font_weight(700).with_font_size(20.0),
            Block::paragraph("plain text").with_font_size(12.0),
        ];
        let nodes = headings(&blocks, &HeadingPolicy::default());
        assert_eq!(titles(&nodes), vec!["Intro", "Chapter", "Heavy"]);
        let levels: Vec<u8> = nodes.iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![1, 4, 2]);
    }

    #[test]
    fn test_relative_size_rule() {
        let blocks = vec![
            Block::paragraph("Overview").with_font_size(16.0),
            Block::paragraph("body one").with_font_size(11.0),
            Block::paragraph("body two").with_font_size(11.0),
            Block::paragraph("body three").with_font_size(11.0),
        ];
        let nodes = headings(&blocks, &HeadingPolicy::default());
        assert_eq!(titles(&nodes), vec!["Overview"]);
        assert_eq!(nodes[0].level, 4);
    }

    #[test]
    fn test_no_candidates() {
        let blocks = vec![
            Block::paragraph("same").with_font_size(12.0),
            Block::paragraph("same again").with_font_size(12.0),
        ];
        assert!(headings(&blocks, &HeadingPolicy::default()).is_empty());
    }

    #[test]
    fn test_generated_ids_stay_unique() {
        let blocks = vec![
            Block::heading(1, "Overview").with_id("flow-heading-1"),
            Block::heading(2, "Details"),
        ];
        let nodes = headings(&blocks, &HeadingPolicy::default());
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["flow-heading-1", "flow-heading-1-1"]);
    }

    #[test]
    fn test_level_bands() {
        let policy = HeadingPolicy::default();
        assert_eq!(policy.level_for_size(Some(30.0)), 1);
        assert_eq!(policy.level_for_size(Some(20.0)), 2);
        assert_eq!(policy.level_for_size(Some(18.5)), 3);
        assert_eq!(policy.level_for_size(Some(12.0)), 4);
        assert_eq!(policy.level_for_size(None), 4);
    }

    #[test]
    fn test_validate() {
        assert!(HeadingPolicy::default().validate().is_ok());
        assert!(HeadingPolicy::default()
            .with_relative_margin(0.0)
            .validate()
            .is_err());
        assert!(HeadingPolicy::default()
            .with_max_heading_chars(0)
            .validate()
            .is_err());
    }
}
