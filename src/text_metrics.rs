//! Font-backed text measurement.
//!
//! System fonts are loaded lazily through `fontdb` the first time a family is requested; each
//! resolved face keeps its horizontal advances so repeated measurements stay cheap. The catalog
//! is process-wide, but it only ever answers "how wide is this string", so layouts computed
//! concurrently cannot observe each other.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CATALOG: Lazy<Mutex<FontCatalog>> = Lazy::new(|| Mutex::new(FontCatalog::new()));

/// Width in pixels of a single line of `text`, or `None` when no usable font is installed.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut catalog = FONT_CATALOG.lock().ok()?;
    catalog.measure(text, font_size, font_family)
}

struct FontCatalog {
    db: Database,
    system_fonts_loaded: bool,
    faces: HashMap<String, Option<LoadedFace>>,
}

impl FontCatalog {
    fn new() -> Self {
        Self {
            db: Database::new(),
            system_fonts_loaded: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                tracing::debug!(family = %key, "no system font matched, using fallback widths");
            }
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        Some(face.line_width(&text.replace('\t', "    "), font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<LoadedFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names.iter().map(|name| css_family(name)).collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.system_fonts_loaded {
            self.db.load_system_fonts();
            self.system_fonts_loaded = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| LoadedFace::parse(data.to_vec(), index))
            .flatten()
    }
}

fn css_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
        "monospace" | "ui-monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

fn family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

struct LoadedFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii_advances: [u16; 128],
    advances: HashMap<char, Option<u16>>,
}

impl LoadedFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = f32::from(face.units_per_em().max(1));
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advances: HashMap::new(),
        })
    }

    fn line_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars().filter(|ch| *ch != '\n') {
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|adv| *adv > 0)
            } else {
                self.advance_of(ch)
            };
            width += match advance {
                Some(adv) => f32::from(adv) * scale,
                None => fallback,
            };
        }
        width.max(0.0)
    }

    fn advance_of(&mut self, ch: char) -> Option<u16> {
        if let Some(cached) = self.advances.get(&ch) {
            return *cached;
        }
        let advance = Face::parse(&self.data, self.index).ok().and_then(|face| {
            let glyph = face.glyph_index(ch)?;
            face.glyph_hor_advance(glyph)
        });
        self.advances.insert(ch, advance);
        advance
    }
}
