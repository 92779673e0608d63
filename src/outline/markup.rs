//! Headings of markup documents.

use super::UniqueIds;
use crate::model::{Block, OutlineNode, PositionRef};
use regex::Regex;
use std::sync::OnceLock;

/// Headings from rendered `h1`..`h6` blocks.
///
/// Explicit block ids are kept; headings without one get a generated
/// `heading-{n}` that avoids every explicit id.
pub(crate) fn from_blocks(blocks: &[Block]) -> Vec<OutlineNode> {
    let headings: Vec<_> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.trimmed_text().is_empty())
        .filter_map(|(i, b)| b.heading_rank().map(|rank| (i, rank, b)))
        .collect();

    let mut ids = UniqueIds::default();
    for (_, _, block) in &headings {
        if let Some(id) = &block.id {
            ids.reserve(id);
        }
    }

    headings
        .into_iter()
        .enumerate()
        .map(|(n, (index, rank, block))| {
            let id = match &block.id {
                Some(id) => id.clone(),
                None => ids.allocate(format!("heading-{}", n)),
            };
            OutlineNode::new(
                id.clone(),
                block.trimmed_text(),
                rank,
                PositionRef::Element {
                    id,
                    order: index as u32,
                },
            )
        })
        .collect()
}

fn atx_heading() -> &'static Regex {
    static ATX: OnceLock<Regex> = OnceLock::new();
    ATX.get_or_init(|| {
        Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$")
            .expect("valid heading pattern")
    })
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|&c| c == ch).count();
    (run >= 3).then_some((ch, run))
}

/// GitHub-style anchor slug.
///
/// Lowercases, drops punctuation and turns spaces into hyphens. Letters and
/// digits of any script are kept.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c == ' ' {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// Headings from raw markdown text.
///
/// Only ATX headings outside fenced code blocks are recognised. The element
/// order is the source line index, so scroll positions for these outlines
/// are built from heading ids with [`crate::sync::heading_geometry`].
pub(crate) fn from_markdown(text: &str) -> Vec<OutlineNode> {
    let mut nodes = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut slugs = UniqueIds::default();

    for (line_no, line) in text.lines().enumerate() {
        if let Some((ch, len)) = fence_marker(line) {
            match fence {
                None => fence = Some((ch, len)),
                Some((open_ch, open_len)) if ch == open_ch && len >= open_len => fence = None,
                Some(_) => {}
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }

        let Some(caps) = atx_heading().captures(line) else {
            continue;
        };
        let title = caps.get(2).map_or("", |m| m.as_str()).trim();
        if title.is_empty() {
            continue;
        }
        let level = caps[1].len() as u8;
        let id = slugs.allocate(slugify(title));
        nodes.push(OutlineNode::new(
            id.clone(),
            title,
            level,
            PositionRef::Element {
                id,
                order: line_no as u32,
            },
        ));
    }
    nodes
}
