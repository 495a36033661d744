//! Medium-independent page model for the printed certificate.
//!
//! All geometry is in millimetres on an A4 portrait page, origin top left.
//! Text is positioned by its baseline; `top` is derived from the font
//! ascent so every backend can place the text box the same way.

mod certificate;
mod date;

pub use certificate::{render, Branding};
pub use date::format_display;

use serde::{Serialize, Serializer};

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;

const PT_TO_MM: f64 = 25.4 / 72.0;
/// Ascent of the sans family (Liberation Sans / Helvetica metrics), in em.
const ASCENT_EM: f64 = 0.905;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

pub mod palette {
    use super::Rgb;

    pub const PRIMARY_TEXT: Rgb = Rgb(0x11, 0x11, 0x11);
    pub const DEEP_ACCENT: Rgb = Rgb(0x3A, 0x0F, 0x14);
    pub const TABLE_HEADER_BG: Rgb = Rgb(0xE7, 0xE3, 0xDC);
    pub const TABLE_ROW_BG: Rgb = Rgb(0xF4, 0xF2, 0xEE);
    pub const BORDER: Rgb = Rgb(0xC9, 0xC4, 0xBC);
    pub const MUTED: Rgb = Rgb(100, 100, 100);
    pub const SIGNAL_RED: Rgb = Rgb(255, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// `x` is the left edge of the text.
    Left,
    /// `x` is the horizontal centre of the text.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub size: u8,
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    pub const fn regular(size: u8) -> Self {
        Self { size, bold: false, italic: false }
    }

    pub const fn bold(size: u8) -> Self {
        Self { size, bold: true, italic: false }
    }

    pub const fn italic(size: u8) -> Self {
        Self { size, bold: false, italic: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBox {
    pub x: f64,
    pub baseline: f64,
    pub top: f64,
    /// Font size in points.
    pub size: u8,
    pub bold: bool,
    pub italic: bool,
    pub anchor: Anchor,
    pub runs: Vec<Run>,
}

#[cfg(test)]
impl TextBox {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Colour of the first run.
    pub fn color(&self) -> Option<Rgb> {
        self.runs.first().map(|r| r.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    pub stroke_width: f64,
}

/// Square area holding the verification token image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBox {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub source: String,
}

/// Raster image (the school logo), stretched to fill its box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Text(TextBox),
    Rect(RectBox),
    Token(TokenBox),
    Image(ImageBox),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub items: Vec<Primitive>,
}

impl Page {
    fn new() -> Self {
        Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            items: Vec::new(),
        }
    }

    fn push_text(&mut self, x: f64, baseline: f64, style: TextStyle, text: &str, color: Rgb) {
        self.push_runs(x, baseline, style, Anchor::Left, vec![run(text, color)]);
    }

    fn push_runs(&mut self, x: f64, baseline: f64, style: TextStyle, anchor: Anchor, runs: Vec<Run>) {
        let ascent = f64::from(style.size) * PT_TO_MM * ASCENT_EM;
        self.items.push(Primitive::Text(TextBox {
            x,
            baseline,
            top: baseline - ascent,
            size: style.size,
            bold: style.bold,
            italic: style.italic,
            anchor,
            runs,
        }));
    }

    fn push_rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Option<Rgb>, stroke: Option<Rgb>) {
        self.items.push(Primitive::Rect(RectBox {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            stroke_width: 0.3,
        }));
    }

    fn push_image(&mut self, x: f64, y: f64, width: f64, height: f64, source: &str) {
        self.items.push(Primitive::Image(ImageBox {
            x,
            y,
            width,
            height,
            source: source.to_string(),
        }));
    }

    fn push_token(&mut self, x: f64, y: f64, size: f64, source: &str) {
        self.items.push(Primitive::Token(TokenBox {
            x,
            y,
            size,
            source: source.to_string(),
        }));
    }
}

#[cfg(test)]
impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextBox> {
        self.items.iter().filter_map(|item| match item {
            Primitive::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectBox> {
        self.items.iter().filter_map(|item| match item {
            Primitive::Rect(rect) => Some(rect),
            _ => None,
        })
    }

    pub fn token(&self) -> Option<&TokenBox> {
        self.items.iter().find_map(|item| match item {
            Primitive::Token(token) => Some(token),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageBox> {
        self.items.iter().filter_map(|item| match item {
            Primitive::Image(image) => Some(image),
            _ => None,
        })
    }

    /// First text box whose full text equals `needle`.
    pub fn find_text(&self, needle: &str) -> Option<&TextBox> {
        self.texts().find(|t| t.text() == needle)
    }
}

fn run(text: &str, color: Rgb) -> Run {
    Run {
        text: text.to_string(),
        color,
    }
}

/// The two printed pages of one certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub pages: [Page; 2],
}
