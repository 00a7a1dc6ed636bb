use crate::error::DocFlowError;
use crate::measure::MeasureError;
use crate::types::Pt;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const FIRST_CHAR: u32 = 32;
const LAST_CHAR: u32 = 255;

// Advance widths for U+0020..=U+007E in 1/1000 em, from the standard
// Helvetica font metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722, 722, 667,
    611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500,
    222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722, 722, 667,
    611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667,
    667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556,
    278, 889, 611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[derive(Debug)]
struct LoadedFont {
    name: String,
    // Per-char advances for FIRST_CHAR..; 0 marks a char the font cannot map.
    widths: Vec<u16>,
    line_height_1000: Option<i32>,
    // Kept for chars outside the precomputed range.
    data: Option<Vec<u8>>,
}

/// Font metrics available to `FontMeasurer`: the built-in Helvetica pair plus
/// any TrueType/OpenType faces registered by the caller.
#[derive(Debug)]
pub struct FontBook {
    fonts: Vec<LoadedFont>,
    lookup: HashMap<String, usize>,
}

impl FontBook {
    /// Book with only the built-in Helvetica and Helvetica-Bold metrics.
    pub fn with_builtins() -> Self {
        let mut book = Self {
            fonts: Vec::new(),
            lookup: HashMap::new(),
        };
        book.insert(builtin_font("Helvetica", &HELVETICA_WIDTHS), &[]);
        book.insert(builtin_font("Helvetica-Bold", &HELVETICA_BOLD_WIDTHS), &[]);
        book
    }

    pub fn register_file(&mut self, path: impl AsRef<Path>) -> Result<String, DocFlowError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let source = path
            .file_stem()
            .and_then(|v| v.to_str())
            .unwrap_or("EmbeddedFont")
            .to_string();
        self.register_bytes(data, Some(&source))
    }

    /// Registers a font program and returns its primary name. Every name
    /// the face declares (family, full, PostScript) resolves to it.
    pub fn register_bytes(
        &mut self,
        data: Vec<u8>,
        source_name: Option<&str>,
    ) -> Result<String, DocFlowError> {
        let source = source_name.unwrap_or("EmbeddedFont");
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| DocFlowError::Font(format!("invalid font data for {source}: {err}")))?;

        let (name, aliases) = font_names(&face, source);
        let units_per_em = i32::from(face.units_per_em().max(1));
        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                char::from_u32(code)
                    .and_then(|ch| face.glyph_index(ch))
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| scale_units(i32::from(adv), units_per_em))
                    .unwrap_or(0)
            })
            .collect();
        let height = i32::from(face.ascender()) - i32::from(face.descender())
            + i32::from(face.line_gap());
        let line_height_1000 = (height > 0).then(|| i32::from(scale_units(height, units_per_em)));
        drop(face);

        let font = LoadedFont {
            name: name.clone(),
            widths,
            line_height_1000,
            data: Some(data),
        };
        self.insert(font, &aliases);
        log::debug!("registered font {name} from {source}");
        Ok(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(&normalize_name(name))
    }

    pub fn font_names(&self) -> Vec<&str> {
        self.fonts.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn measure_text_width(
        &self,
        name: &str,
        font_size: Pt,
        text: &str,
    ) -> Result<Pt, MeasureError> {
        let font = self
            .resolve(name)
            .ok_or_else(|| MeasureError::UnknownFont(name.to_string()))?;
        let mut total_units: i32 = 0;
        for ch in text.chars() {
            let adv = font.advance_for_char(ch)?;
            total_units = total_units.saturating_add(i32::from(adv));
        }
        if total_units <= 0 {
            return Ok(Pt::ZERO);
        }
        Ok(font_size.mul_ratio(total_units, 1000))
    }

    /// Line height from the face's vertical metrics, when it declares them.
    pub fn line_height(&self, name: &str, font_size: Pt) -> Option<Pt> {
        let font = self.resolve(name)?;
        font.line_height_1000
            .map(|units| font_size.mul_ratio(units, 1000))
    }

    fn resolve(&self, name: &str) -> Option<&LoadedFont> {
        self.lookup
            .get(&normalize_name(name))
            .and_then(|index| self.fonts.get(*index))
    }

    fn insert(&mut self, font: LoadedFont, aliases: &[String]) {
        let index = self.fonts.len();
        let primary = font.name.clone();
        self.fonts.push(font);
        for alias in std::iter::once(&primary).chain(aliases) {
            let key = normalize_name(alias);
            if key.is_empty() {
                continue;
            }
            // Later registrations override earlier ones with the same name.
            self.lookup.insert(key, index);
        }
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl LoadedFont {
    fn advance_for_char(&self, ch: char) -> Result<u16, MeasureError> {
        let code = ch as u32;
        if (FIRST_CHAR..=LAST_CHAR).contains(&code) {
            let idx = (code - FIRST_CHAR) as usize;
            if let Some(width) = self.widths.get(idx).copied().filter(|w| *w > 0) {
                return Ok(width);
            }
        }
        let Some(data) = self.data.as_deref() else {
            return Err(MeasureError::MissingGlyph(ch));
        };
        let face = ttf_parser::Face::parse(data, 0).map_err(|_| MeasureError::MissingGlyph(ch))?;
        let units_per_em = i32::from(face.units_per_em().max(1));
        face.glyph_index(ch)
            .and_then(|gid| face.glyph_hor_advance(gid))
            .map(|adv| scale_units(i32::from(adv), units_per_em))
            .ok_or(MeasureError::MissingGlyph(ch))
    }
}

fn builtin_font(name: &str, widths: &[u16; 95]) -> LoadedFont {
    let mut table = vec![0u16; (LAST_CHAR - FIRST_CHAR + 1) as usize];
    table[..widths.len()].copy_from_slice(widths);
    LoadedFont {
        name: name.to_string(),
        widths: table,
        line_height_1000: None,
        data: None,
    }
}

fn scale_units(value: i32, units_per_em: i32) -> u16 {
    let scaled = (value * 1000 + units_per_em / 2) / units_per_em;
    scaled.clamp(0, i32::from(u16::MAX)) as u16
}

fn font_names(face: &ttf_parser::Face<'_>, source: &str) -> (String, Vec<String>) {
    use ttf_parser::name::name_id;

    let mut family = None;
    let mut full = None;
    let mut post = None;

    for entry in face.names() {
        let Some(name) = entry.to_string() else {
            continue;
        };
        match entry.name_id {
            name_id::TYPOGRAPHIC_FAMILY | name_id::FAMILY => {
                family.get_or_insert(name);
            }
            name_id::FULL_NAME => {
                full.get_or_insert(name);
            }
            name_id::POST_SCRIPT_NAME => {
                post.get_or_insert(name);
            }
            _ => {}
        }
    }

    let stem = Some(source.to_string());
    let primary = post
        .clone()
        .or_else(|| full.clone())
        .or_else(|| family.clone())
        .unwrap_or_else(|| source.to_string());

    let aliases = [family, full, post, stem]
        .into_iter()
        .flatten()
        .filter(|candidate| *candidate != primary)
        .collect();

    (primary, aliases)
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_helvetica_measures_ascii() {
        let book = FontBook::with_builtins();
        // "Hi" = 722 + 222 units at 10pt.
        let width = book
            .measure_text_width("Helvetica", Pt::from_i32(10), "Hi")
            .expect("ascii is covered");
        assert_eq!(width, Pt::from_f32(9.44));
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let book = FontBook::with_builtins();
        let size = Pt::from_i32(12);
        let regular = book.measure_text_width("Helvetica", size, "Total").expect("regular");
        let bold = book.measure_text_width("helvetica-bold", size, "Total").expect("bold");
        assert!(bold > regular);
    }

    #[test]
    fn unknown_font_and_missing_glyph_are_reported() {
        let book = FontBook::with_builtins();
        let size = Pt::from_i32(10);
        assert!(matches!(
            book.measure_text_width("Comic Sans", size, "x"),
            Err(MeasureError::UnknownFont(_))
        ));
        assert!(matches!(
            book.measure_text_width("Helvetica", size, "\u{4e2d}"),
            Err(MeasureError::MissingGlyph('\u{4e2d}'))
        ));
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let mut book = FontBook::with_builtins();
        let err = book
            .register_bytes(vec![0, 1, 2, 3], Some("broken"))
            .expect_err("not a font");
        assert!(matches!(err, DocFlowError::Font(_)));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn names_are_normalized() {
        let book = FontBook::with_builtins();
        assert!(book.contains(" 'HELVETICA' "));
        assert_eq!(book.font_names(), vec!["Helvetica", "Helvetica-Bold"]);
    }
}
