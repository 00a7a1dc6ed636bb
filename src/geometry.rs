use crate::error::DocFlowError;
use crate::types::{Pt, Size};
use serde::{Deserialize, Serialize};

/// Fixed page dimensions shared by every page of a run.
///
/// Content is placed between `margin` and `height - footer_band_height`;
/// the band below that line belongs to the footer alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: Pt,
    pub height: Pt,
    pub margin: Pt,
    pub footer_band_height: Pt,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32, margin: f32, footer_band_height: f32) -> Self {
        Self {
            width: Pt::from_f32(width),
            height: Pt::from_f32(height),
            margin: Pt::from_f32(margin),
            footer_band_height: Pt::from_f32(footer_band_height),
        }
    }

    pub fn from_size(size: Size, margin: f32, footer_band_height: f32) -> Self {
        Self {
            width: size.width,
            height: size.height,
            margin: Pt::from_f32(margin),
            footer_band_height: Pt::from_f32(footer_band_height),
        }
    }

    pub fn a4() -> Self {
        Self::from_size(Size::a4(), 40.0, 50.0)
    }

    pub fn letter() -> Self {
        Self::from_size(Size::letter(), 40.0, 50.0)
    }

    pub fn content_width(&self) -> Pt {
        self.width - self.margin * 2
    }

    pub fn content_left(&self) -> Pt {
        self.margin
    }

    pub fn content_right(&self) -> Pt {
        self.width - self.margin
    }

    /// First y that content may not reach; also the top of the footer band.
    pub fn content_bottom(&self) -> Pt {
        self.height - self.footer_band_height
    }

    /// Height available to content on a fresh page.
    pub fn usable_height(&self) -> Pt {
        self.content_bottom() - self.margin
    }

    pub fn validate(&self) -> Result<(), DocFlowError> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("margin", self.margin),
            ("footer_band_height", self.footer_band_height),
        ] {
            if !value.is_positive() {
                return Err(DocFlowError::invalid(format!(
                    "page geometry {name} must be positive (got {})",
                    value.to_f32()
                )));
            }
        }
        if !self.content_width().is_positive() {
            return Err(DocFlowError::invalid(format!(
                "margins leave no content width (width {}, margin {})",
                self.width.to_f32(),
                self.margin.to_f32()
            )));
        }
        if self.footer_band_height >= self.height - self.margin * 2 {
            return Err(DocFlowError::invalid(format!(
                "footer band {} leaves no usable height (height {}, margin {})",
                self.footer_band_height.to_f32(),
                self.height.to_f32(),
                self.margin.to_f32()
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_defaults_are_valid() {
        let geometry = PageGeometry::a4();
        geometry.validate().expect("a4 is valid");
        assert_eq!(geometry.content_width(), Pt::from_f32(515.28));
        assert_eq!(geometry.content_bottom(), Pt::from_f32(791.89));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let err = PageGeometry::new(0.0, 800.0, 40.0, 50.0)
            .validate()
            .expect_err("zero width");
        assert!(err.to_string().contains("width"));

        let err = PageGeometry::new(600.0, 800.0, -1.0, 50.0)
            .validate()
            .expect_err("negative margin");
        assert!(err.to_string().contains("margin"));
    }

    #[test]
    fn rejects_footer_band_consuming_usable_height() {
        let err = PageGeometry::new(600.0, 200.0, 50.0, 100.0)
            .validate()
            .expect_err("band equals usable height");
        assert!(err.to_string().contains("footer band"));

        PageGeometry::new(600.0, 200.0, 50.0, 99.0)
            .validate()
            .expect("one point left");
    }

    #[test]
    fn rejects_margins_wider_than_page() {
        let err = PageGeometry::new(100.0, 800.0, 50.0, 20.0)
            .validate()
            .expect_err("no content width");
        assert!(err.to_string().contains("content width"));
    }
}
