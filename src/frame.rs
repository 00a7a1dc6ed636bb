use crate::geometry::PageGeometry;
use crate::types::Pt;

/// Running `(page, y)` position of one layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    geometry: PageGeometry,
    page: usize,
    y: Pt,
}

impl Frame {
    pub(crate) fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            page: 1,
            y: geometry.margin,
        }
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    pub(crate) fn y(&self) -> Pt {
        self.y
    }

    pub(crate) fn remaining_height(&self) -> Pt {
        (self.geometry.content_bottom() - self.y).max(Pt::ZERO)
    }

    pub(crate) fn is_at_page_top(&self) -> bool {
        self.y <= self.geometry.margin
    }

    /// Content of `needed` height placed at the cursor stays above the footer
    /// band. Exactly filling the remaining space still fits.
    pub(crate) fn fits(&self, needed: Pt) -> bool {
        self.y + needed <= self.geometry.content_bottom()
    }

    pub(crate) fn advance(&mut self, height: Pt) {
        self.y = (self.y + height).min(self.geometry.content_bottom());
    }

    pub(crate) fn next_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.margin;
    }
}
