use crate::font::FontBook;
use crate::types::Pt;
use std::sync::Arc;
use thiserror::Error;

/// Why a width could not be measured. Never leaves the measurer: callers go
/// through [`TextMeasurer::text_width`], which substitutes an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    #[error("unknown font {0}")]
    UnknownFont(String),
    #[error("no glyph for {0:?}")]
    MissingGlyph(char),
}

/// Width estimate used whenever real metrics are unavailable: 0.6 em per char.
pub fn fallback_width(text: &str, font_size: Pt) -> Pt {
    let char_width = font_size.mul_ratio(3, 5).max(Pt::from_f32(1.0));
    char_width * (text.chars().count() as i32)
}

/// Sizes and wraps text. The layout engine never measures text itself.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, font_size: Pt, font_name: &str) -> Result<Pt, MeasureError>;

    fn text_width(&self, text: &str, font_size: Pt, font_name: &str) -> Pt {
        match self.measure(text, font_size, font_name) {
            Ok(width) => width,
            Err(err) => {
                log::debug!("measure fallback for {font_name}: {err}");
                fallback_width(text, font_size)
            }
        }
    }

    fn line_height(&self, font_size: Pt, _font_name: &str) -> Pt {
        font_size.mul_ratio(6, 5)
    }

    /// Greedy word wrap. Always returns at least one line; explicit newlines
    /// start new lines and a word wider than `max_width` gets a line of its
    /// own without being split.
    fn wrap(&self, text: &str, max_width: Pt, font_size: Pt, font_name: &str) -> Vec<String> {
        let space_width = self.text_width(" ", font_size, font_name);
        let mut lines = Vec::new();
        for segment in text.split('\n') {
            let mut current = String::new();
            let mut current_width = Pt::ZERO;
            for word in segment.split_whitespace() {
                let word_width = self.text_width(word, font_size, font_name);
                if current.is_empty() {
                    current.push_str(word);
                    current_width = word_width;
                    continue;
                }
                let next_width = current_width + space_width + word_width;
                if next_width > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    current.push(' ');
                    current.push_str(word);
                    current_width = next_width;
                }
            }
            lines.push(current);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

/// Measurer backed by real font metrics.
#[derive(Debug, Clone)]
pub struct FontMeasurer {
    fonts: Arc<FontBook>,
}

impl FontMeasurer {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }
}

impl Default for FontMeasurer {
    fn default() -> Self {
        Self::new(Arc::new(FontBook::with_builtins()))
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, font_size: Pt, font_name: &str) -> Result<Pt, MeasureError> {
        self.fonts.measure_text_width(font_name, font_size, text)
    }

    fn line_height(&self, font_size: Pt, font_name: &str) -> Pt {
        let fallback = font_size.mul_ratio(6, 5);
        self.fonts
            .line_height(font_name, font_size)
            .map_or(fallback, |height| height.max(fallback))
    }
}

/// Every char advances by the same fraction of the font size. Handy where
/// layout arithmetic has to be predictable.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasurer {
    advance_num: i32,
    advance_den: i32,
}

impl FixedWidthMeasurer {
    pub fn new(advance_num: i32, advance_den: i32) -> Self {
        Self {
            advance_num,
            advance_den: advance_den.max(1),
        }
    }
}

impl Default for FixedWidthMeasurer {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure(&self, text: &str, font_size: Pt, _font_name: &str) -> Result<Pt, MeasureError> {
        let advance = font_size.mul_ratio(self.advance_num, self.advance_den);
        Ok(advance * (text.chars().count() as i32))
    }
}
