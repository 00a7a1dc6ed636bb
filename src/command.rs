use crate::geometry::PageGeometry;
use crate::style::{TextAlign, TextStyle};
use crate::types::{Color, Pt, Rect};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a filled rectangle is for, so renderers and checks can tell table
/// chrome apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillRole {
    TableHeader,
    /// Zebra stripe behind a table row; `row` is the item's index in the full list.
    RowStripe { row: usize },
}

/// One positioned drawing instruction. `y` grows downward from the page top
/// and every coordinate is absolute on its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// A single line of text. `x` is the anchor for `align`; `y` is the top
    /// of the line box of height `height`.
    Text {
        page: usize,
        x: Pt,
        y: Pt,
        text: String,
        style: TextStyle,
        align: TextAlign,
        width: Pt,
        height: Pt,
    },
    FilledRect {
        page: usize,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        color: Color,
        role: FillRole,
    },
    Line {
        page: usize,
        x: Pt,
        y: Pt,
        x2: Pt,
        y2: Pt,
        stroke_width: Pt,
        color: Color,
    },
    /// Everything drawn in the footer band of one page. `page_label` has
    /// `{page}`/`{pages}` already substituted once layout completes.
    FooterGroup {
        page: usize,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        message: String,
        page_label: String,
        style: TextStyle,
        rule_color: Option<Color>,
    },
}

impl DrawCommand {
    pub fn page(&self) -> usize {
        match self {
            DrawCommand::Text { page, .. }
            | DrawCommand::FilledRect { page, .. }
            | DrawCommand::Line { page, .. }
            | DrawCommand::FooterGroup { page, .. } => *page,
        }
    }

    pub fn is_footer(&self) -> bool {
        matches!(self, DrawCommand::FooterGroup { .. })
    }

    /// Box the command paints into.
    pub fn bounds(&self) -> Rect {
        match self {
            DrawCommand::Text {
                x,
                y,
                align,
                width,
                height,
                ..
            } => Rect {
                x: align.left_edge(*x, *width),
                y: *y,
                width: *width,
                height: *height,
            },
            DrawCommand::FilledRect {
                x,
                y,
                width,
                height,
                ..
            }
            | DrawCommand::FooterGroup {
                x,
                y,
                width,
                height,
                ..
            } => Rect {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            },
            DrawCommand::Line { x, y, x2, y2, .. } => Rect {
                x: (*x).min(*x2),
                y: (*y).min(*y2),
                width: (*x - *x2).max(*x2 - *x),
                height: (*y - *y2).max(*y2 - *y),
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub commands: Vec<DrawCommand>,
}

impl Page {
    fn new(number: usize) -> Self {
        Self {
            number,
            commands: Vec::new(),
        }
    }

    pub fn footer_count(&self) -> usize {
        self.commands.iter().filter(|cmd| cmd.is_footer()).count()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.commands
            .iter()
            .filter_map(DrawCommand::text)
            .any(|text| text.contains(needle))
    }
}

/// Output of one layout run: commands grouped by page, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.pages.iter().flat_map(|page| page.commands.iter())
    }

    pub fn command_count(&self) -> usize {
        self.pages.iter().map(|page| page.commands.len()).sum()
    }

    /// Page-grouped command lists, dropping the page wrappers.
    pub fn into_command_pages(self) -> Vec<Vec<DrawCommand>> {
        self.pages.into_iter().map(|page| page.commands).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Hex SHA-256 of the JSON encoding. Identical inputs to a run give
    /// identical fingerprints.
    pub fn fingerprint_sha256(&self) -> String {
        // Only structs, enums, strings and integers: encoding has no failure path.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        let mut out = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

/// Records commands page by page, stamping each with its page number.
pub(crate) struct Canvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
    current: Page,
}

impl Canvas {
    pub(crate) fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::new(1),
        }
    }

    pub(crate) fn page_number(&self) -> usize {
        self.current.number
    }

    pub(crate) fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn draw_text(
        &mut self,
        x: Pt,
        y: Pt,
        text: impl Into<String>,
        style: &TextStyle,
        align: TextAlign,
        width: Pt,
        height: Pt,
    ) {
        self.current.commands.push(DrawCommand::Text {
            page: self.current.number,
            x,
            y,
            text: text.into(),
            style: style.clone(),
            align,
            width,
            height,
        });
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Color, role: FillRole) {
        self.current.commands.push(DrawCommand::FilledRect {
            page: self.current.number,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color,
            role,
        });
    }

    pub(crate) fn line(&mut self, x: Pt, y: Pt, x2: Pt, y2: Pt, stroke_width: Pt, color: Color) {
        self.current.commands.push(DrawCommand::Line {
            page: self.current.number,
            x,
            y,
            x2,
            y2,
            stroke_width,
            color,
        });
    }

    pub(crate) fn footer(
        &mut self,
        message: &str,
        page_label_template: &str,
        style: &TextStyle,
        rule_color: Option<Color>,
    ) {
        let y = self.geometry.content_bottom();
        self.current.commands.push(DrawCommand::FooterGroup {
            page: self.current.number,
            x: self.geometry.content_left(),
            y,
            width: self.geometry.content_width(),
            height: self.geometry.height - y,
            message: message.to_string(),
            page_label: page_label_template.to_string(),
            style: style.clone(),
            rule_color,
        });
    }

    pub(crate) fn show_page(&mut self) {
        let next = Page::new(self.current.number + 1);
        let current = std::mem::replace(&mut self.current, next);
        self.pages.push(current);
    }

    /// Closes the open page and fills `{page}` / `{pages}` in footer labels.
    pub(crate) fn finish(mut self) -> LaidOutDocument {
        let current = std::mem::replace(&mut self.current, Page::new(0));
        self.pages.push(current);
        let total_pages = self.pages.len();
        for laid_page in &mut self.pages {
            for cmd in &mut laid_page.commands {
                if let DrawCommand::FooterGroup {
                    page, page_label, ..
                } = cmd
                {
                    *page_label = substitute_page_placeholders(page_label, *page, total_pages);
                }
            }
        }
        LaidOutDocument {
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}

pub(crate) fn substitute_page_placeholders(template: &str, page: usize, total: usize) -> String {
    template
        .replace("{page}", &page.to_string())
        .replace("{pages}", &total.to_string())
}
