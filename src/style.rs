use crate::types::{Color, Pt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Text appearance carried by every text call and every `Text` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_name: Arc<str>,
    pub font_size: Pt,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font_name: impl Into<Arc<str>>, font_size: Pt, color: Color) -> Self {
        Self {
            font_name: font_name.into(),
            font_size,
            color,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: Arc::<str>::from("Helvetica"),
            font_size: Pt::from_i32(10),
            color: Color::BLACK,
        }
    }
}

/// Horizontal anchoring of a text run relative to its `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Left edge of a run of `width` anchored at `x`.
    pub fn left_edge(self, x: Pt, width: Pt) -> Pt {
        match self {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2,
            TextAlign::Right => x - width,
        }
    }
}
