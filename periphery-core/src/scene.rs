use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color.
pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];
pub const RED: Rgba = [255, 0, 0, 255];

/// A block of text placed in screen centimeters, origin at the screen
/// center with y pointing up. Multi-line content is centered line by line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub content: String,
    pub position_cm: (f64, f64),
    pub height_cm: f64,
    pub color: Rgba,
}

/// Everything drawn in one presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgba,
    pub items: Vec<TextItem>,
}

impl Scene {
    pub fn new(background: Rgba) -> Self {
        Self {
            background,
            items: Vec::new(),
        }
    }

    pub fn with(mut self, item: TextItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn contains_text(&self, content: &str) -> bool {
        self.items.iter().any(|item| item.content == content)
    }
}
