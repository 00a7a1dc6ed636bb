use crate::audit;
use crate::command::{DrawCommand, FillRole, LaidOutDocument};
use crate::error::DocFlowError;
use crate::style::TextAlign;
use crate::types::{Color, Pt};
use std::fmt::Write as _;

/// Turns a finished command stream into an output artifact (PDF bytes,
/// a preview, ...). Renderers draw what they are given and never measure.
pub trait Renderer {
    type Output;

    fn render(&mut self, document: &LaidOutDocument) -> Result<Self::Output, DocFlowError>;
}

/// Plain-text listing of every page and command, one line each. Useful as a
/// print preview and for diffing layouts in tests.
#[derive(Debug, Clone, Default)]
pub struct OutlineRenderer {
    /// Refuse documents that fail [`audit::check`]; warnings are let through.
    pub strict: bool,
}

impl OutlineRenderer {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl Renderer for OutlineRenderer {
    type Output = String;

    fn render(&mut self, document: &LaidOutDocument) -> Result<String, DocFlowError> {
        if self.strict {
            let violations: Vec<_> = audit::check(document)
                .into_iter()
                .filter(|violation| !violation.is_warning())
                .collect();
            if let Some(first) = violations.first() {
                return Err(DocFlowError::invalid(format!(
                    "{} layout violations, first: {first}",
                    violations.len()
                )));
            }
        }

        let geometry = document.geometry;
        let total = document.page_count();
        let mut out = String::new();
        for page in &document.pages {
            let _ = writeln!(
                out,
                "page {} of {total} ({} x {})",
                page.number,
                pt(geometry.width),
                pt(geometry.height)
            );
            for cmd in &page.commands {
                out.push_str("  ");
                outline_command(&mut out, cmd);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

fn outline_command(out: &mut String, cmd: &DrawCommand) {
    let _ = match cmd {
        DrawCommand::Text {
            x,
            y,
            text,
            style,
            align,
            ..
        } => write!(
            out,
            "text {},{} {} {} {} {text:?}",
            pt(*x),
            pt(*y),
            align_name(*align),
            style.font_name,
            pt(style.font_size)
        ),
        DrawCommand::FilledRect {
            x,
            y,
            width,
            height,
            color,
            role,
            ..
        } => {
            let role = match role {
                FillRole::TableHeader => "header".to_string(),
                FillRole::RowStripe { row } => format!("row {row}"),
            };
            write!(
                out,
                "rect {},{} {}x{} {} {role}",
                pt(*x),
                pt(*y),
                pt(*width),
                pt(*height),
                hex(*color)
            )
        }
        DrawCommand::Line {
            x,
            y,
            x2,
            y2,
            stroke_width,
            color,
            ..
        } => write!(
            out,
            "line {},{} -> {},{} {} {}",
            pt(*x),
            pt(*y),
            pt(*x2),
            pt(*y2),
            pt(*stroke_width),
            hex(*color)
        ),
        DrawCommand::FooterGroup {
            x,
            y,
            message,
            page_label,
            ..
        } => write!(
            out,
            "footer {},{} {message:?} | {page_label:?}",
            pt(*x),
            pt(*y)
        ),
    };
}

fn pt(value: Pt) -> String {
    let milli = value.to_milli_i64();
    let sign = if milli < 0 { "-" } else { "" };
    let milli = milli.unsigned_abs();
    format!("{sign}{}.{:02}", milli / 1000, (milli % 1000) / 10)
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn align_name(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Page;
    use crate::geometry::PageGeometry;
    use crate::style::TextStyle;

    fn document(commands: Vec<DrawCommand>) -> LaidOutDocument {
        LaidOutDocument {
            geometry: PageGeometry::a4(),
            pages: vec![Page {
                number: 1,
                commands,
            }],
        }
    }

    #[test]
    fn lists_commands_in_order() {
        let doc = document(vec![DrawCommand::Text {
            page: 1,
            x: Pt::from_i32(40),
            y: Pt::from_f32(52.5),
            text: "Acme".to_string(),
            style: TextStyle::default(),
            align: TextAlign::Left,
            width: Pt::from_i32(20),
            height: Pt::from_i32(12),
        }]);
        let outline = OutlineRenderer::default().render(&doc).expect("render");
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "page 1 of 1 (595.28 x 841.89)");
        assert_eq!(lines[1], "  text 40.00,52.50 left Helvetica 10.00 \"Acme\"");
    }

    #[test]
    fn strict_mode_rejects_pages_without_footer() {
        let doc = document(Vec::new());
        let err = match OutlineRenderer::strict().render(&doc) {
            Ok(_) => panic!("missing footer should be rejected"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("footer"));
    }
}
