//! Structural checks over a laid-out document: the guarantees a renderer
//! relies on when it draws the command stream without re-measuring.

use crate::command::{DrawCommand, LaidOutDocument};
use crate::types::Pt;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A page carries no footer group, or more than one.
    FooterCount { page: usize, count: usize },
    /// A command's page stamp differs from the page it was grouped under.
    PageMismatch { page: usize, index: usize, stamped: usize },
    /// A coordinate lies outside `[0, width] x [0, height]`.
    OutOfPage { page: usize, index: usize },
    /// Non-footer content reaches below the top of the footer band.
    FooterBandIntrusion { page: usize, index: usize },
    /// A footer group starts above the band or runs past the page.
    FooterOutsideBand { page: usize, index: usize },
    /// Page numbers must run 1, 2, 3, ... without gaps.
    PageSequence { expected: usize, found: usize },
    /// A text run is wider than the page allows. Happens only for a single
    /// word longer than its column, which is placed unsplit.
    TextOverflow { page: usize, index: usize },
}

impl Violation {
    /// Warnings describe accepted but unsightly output; everything else
    /// breaks a guarantee renderers rely on.
    pub fn is_warning(&self) -> bool {
        matches!(self, Violation::TextOverflow { .. })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::FooterCount { page, count } => {
                write!(f, "page {page} has {count} footer groups")
            }
            Violation::PageMismatch {
                page,
                index,
                stamped,
            } => write!(f, "page {page} command {index} is stamped page {stamped}"),
            Violation::OutOfPage { page, index } => {
                write!(f, "page {page} command {index} lies outside the page")
            }
            Violation::FooterBandIntrusion { page, index } => {
                write!(f, "page {page} command {index} enters the footer band")
            }
            Violation::FooterOutsideBand { page, index } => {
                write!(f, "page {page} footer {index} is outside the footer band")
            }
            Violation::PageSequence { expected, found } => {
                write!(f, "expected page {expected}, found page {found}")
            }
            Violation::TextOverflow { page, index } => {
                write!(f, "page {page} text {index} runs past the page edge")
            }
        }
    }
}

/// Returns every violation found, warnings included; an empty list means
/// the document is sound. Text is checked by anchor for page bounds and by
/// its measured width for [`Violation::TextOverflow`].
pub fn check(doc: &LaidOutDocument) -> Vec<Violation> {
    let geometry = doc.geometry;
    let band_top = geometry.content_bottom();
    let in_x = |x: Pt| x >= Pt::ZERO && x <= geometry.width;
    let in_y = |y: Pt| y >= Pt::ZERO && y <= geometry.height;

    let mut out = Vec::new();
    for (position, page) in doc.pages.iter().enumerate() {
        if page.number != position + 1 {
            out.push(Violation::PageSequence {
                expected: position + 1,
                found: page.number,
            });
        }
        let count = page.footer_count();
        if count != 1 {
            out.push(Violation::FooterCount {
                page: page.number,
                count,
            });
        }

        for (index, cmd) in page.commands.iter().enumerate() {
            if cmd.page() != page.number {
                out.push(Violation::PageMismatch {
                    page: page.number,
                    index,
                    stamped: cmd.page(),
                });
            }
            let points_inside = match cmd {
                DrawCommand::Line { x, y, x2, y2, .. } => {
                    in_x(*x) && in_y(*y) && in_x(*x2) && in_y(*y2)
                }
                DrawCommand::Text { x, y, .. } => in_x(*x) && in_y(*y),
                _ => {
                    let bounds = cmd.bounds();
                    in_x(bounds.x) && in_y(bounds.y) && in_x(bounds.right()) && in_y(bounds.bottom())
                }
            };
            if !points_inside {
                out.push(Violation::OutOfPage {
                    page: page.number,
                    index,
                });
            }

            let bounds = cmd.bounds();
            if matches!(cmd, DrawCommand::Text { .. })
                && (bounds.x < Pt::ZERO || bounds.right() > geometry.width)
            {
                out.push(Violation::TextOverflow {
                    page: page.number,
                    index,
                });
            }
            if cmd.is_footer() {
                if bounds.y < band_top || bounds.bottom() > geometry.height {
                    out.push(Violation::FooterOutsideBand {
                        page: page.number,
                        index,
                    });
                }
            } else if bounds.bottom() > band_top {
                out.push(Violation::FooterBandIntrusion {
                    page: page.number,
                    index,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{FillRole, Page};
    use crate::geometry::PageGeometry;
    use crate::style::TextStyle;
    use crate::types::Color;

    fn footer(page: usize, geometry: &PageGeometry) -> DrawCommand {
        DrawCommand::FooterGroup {
            page,
            x: geometry.content_left(),
            y: geometry.content_bottom(),
            width: geometry.content_width(),
            height: geometry.footer_band_height,
            message: "Thanks".to_string(),
            page_label: format!("Page {page}"),
            style: TextStyle::default(),
            rule_color: None,
        }
    }

    fn rect(page: usize, y: f32, height: f32) -> DrawCommand {
        DrawCommand::FilledRect {
            page,
            x: Pt::from_i32(40),
            y: Pt::from_f32(y),
            width: Pt::from_i32(100),
            height: Pt::from_f32(height),
            color: Color::WHITE,
            role: FillRole::RowStripe { row: 0 },
        }
    }

    #[test]
    fn clean_document_has_no_violations() {
        let geometry = PageGeometry::a4();
        let doc = LaidOutDocument {
            geometry,
            pages: vec![Page {
                number: 1,
                commands: vec![rect(1, 100.0, 22.0), footer(1, &geometry)],
            }],
        };
        assert!(check(&doc).is_empty());
    }

    #[test]
    fn flags_missing_footer_and_band_intrusion() {
        let geometry = PageGeometry::a4();
        let doc = LaidOutDocument {
            geometry,
            pages: vec![Page {
                number: 1,
                commands: vec![rect(1, 780.0, 22.0)],
            }],
        };
        let violations = check(&doc);
        assert!(violations.contains(&Violation::FooterCount { page: 1, count: 0 }));
        assert!(violations.contains(&Violation::FooterBandIntrusion { page: 1, index: 0 }));
    }

    #[test]
    fn unsplit_long_word_is_a_text_overflow_warning() {
        let geometry = PageGeometry::a4();
        let word = "x".repeat(200);
        let doc = LaidOutDocument {
            geometry,
            pages: vec![Page {
                number: 1,
                commands: vec![
                    DrawCommand::Text {
                        page: 1,
                        x: Pt::from_i32(46),
                        y: Pt::from_i32(100),
                        text: word,
                        style: TextStyle::default(),
                        align: crate::style::TextAlign::Left,
                        width: Pt::from_i32(1112),
                        height: Pt::from_i32(12),
                    },
                    footer(1, &geometry),
                ],
            }],
        };
        let violations = check(&doc);
        assert_eq!(violations, vec![Violation::TextOverflow { page: 1, index: 0 }]);
        assert!(violations[0].is_warning());
    }

    #[test]
    fn flags_duplicate_footer_and_wrong_page_stamp() {
        let geometry = PageGeometry::a4();
        let doc = LaidOutDocument {
            geometry,
            pages: vec![Page {
                number: 1,
                commands: vec![footer(1, &geometry), footer(2, &geometry)],
            }],
        };
        let violations = check(&doc);
        assert!(violations.contains(&Violation::FooterCount { page: 1, count: 2 }));
        assert!(violations.contains(&Violation::PageMismatch {
            page: 1,
            index: 1,
            stamped: 2
        }));
    }
}
