//! Rendered block elements handed over by external converters.

use serde::{Deserialize, Serialize};

/// Style facts about a rendered block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Bold styling declared inline on the element
    pub inline_bold: bool,

    /// Computed font size in CSS pixels
    pub font_size: Option<f32>,

    /// Computed font weight (400 = normal, 700 = bold)
    pub font_weight: Option<u16>,
}

/// A block element of a rendered document, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Lowercase tag name (`p`, `div`, `h2`, ...)
    pub tag: String,

    /// Element identifier, if the converter assigned one
    pub id: Option<String>,

    /// Space-separated class names
    #[serde(default)]
    pub class_name: String,

    /// Text content
    pub text: String,

    /// Style facts
    #[serde(default)]
    pub style: BlockStyle,
}

impl Block {
    /// Create an unstyled block.
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            id: None,
            class_name: String::new(),
            text: text.into(),
            style: BlockStyle::default(),
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("p", text)
    }

    /// Create a native heading block (`h1`..`h6`).
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(format!("h{}", level.clamp(1, 6)), text)
    }

    /// Set the element identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set class names.
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Set the computed font size.
    pub fn with_font_size(mut self, px: f32) -> Self {
        self.style.font_size = Some(px);
        self
    }

    /// Set the computed font weight.
    pub fn with_font_weight(mut self, weight: u16) -> Self {
        self.style.font_weight = Some(weight);
        self
    }

    /// Mark the block as explicitly bold.
    pub fn bold(mut self) -> Self {
        self.style.inline_bold = true;
        self
    }

    /// Heading rank for native `h1`..`h6` tags.
    pub fn heading_rank(&self) -> Option<u8> {
        let rest = self.tag.strip_prefix('h')?;
        match rest.parse::<u8>() {
            Ok(rank @ 1..=6) => Some(rank),
            _ => None,
        }
    }

    /// Trimmed text content.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Length of the trimmed text in characters.
    pub fn text_len(&self) -> usize {
        self.trimmed_text().chars().count()
    }
}
