// Certificate PDF export
// Uses genpdf - requires Liberation or similar fonts in standard paths
use genpdf::error::Error as GenPdfError;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::render::Area;
use genpdf::style::{Color, LineStyle, Style};
use genpdf::elements::Image;
use genpdf::{Context, Element, Mm, Position, RenderResult, Scale, Size};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::layout::palette::BORDER;
use crate::layout::{
    Anchor, Document, ImageBox, Page, Primitive, RectBox, Rgb, TextBox, TokenBox,
};
use crate::logo::png_bytes;
use crate::qr::decode_modules;

const FONT_PATHS: [&str; 4] = [
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/TTF",
    "/System/Library/Fonts/Supplemental",
    "/Library/Fonts",
];
const FONT_NAMES: [&str; 3] = ["LiberationSans", "DejaVuSans", "Arial"];
/// Resolution genpdf assumes for embedded images.
const IMAGE_DPI: f64 = 300.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("no suitable fonts found, install fonts-liberation or set FONT_DIR")]
    FontsMissing,
    #[error("pdf rendering failed: {0}")]
    Render(#[from] GenPdfError),
}

/// Finds a TrueType family, trying `preferred` before the system paths.
pub fn load_fonts(preferred: Option<&Path>) -> Result<FontFamily<FontData>, PdfError> {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_PATHS.iter().map(PathBuf::from));

    candidates
        .filter(|dir| dir.exists())
        .find_map(|dir| {
            FONT_NAMES
                .iter()
                .find_map(|name| genpdf::fonts::from_files(&dir, name, None).ok())
        })
        .ok_or(PdfError::FontsMissing)
}

/// Renders the laid-out pages into a PDF byte buffer.
pub fn render_pdf(document: &Document, fonts: FontFamily<FontData>) -> Result<Vec<u8>, PdfError> {
    let first = &document.pages[0];

    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(document.title.clone());
    doc.set_paper_size(Size::new(first.width, first.height));
    doc.push(LaidOutPages {
        pages: document.pages.to_vec(),
        next: 0,
    });

    let mut buf = Vec::new();
    doc.render(&mut buf)?;
    Ok(buf)
}

/// Draws one page of primitives per render pass, at absolute positions.
struct LaidOutPages {
    pages: Vec<Page>,
    next: usize,
}

impl Element for LaidOutPages {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, GenPdfError> {
        let Some(page) = self.pages.get(self.next) else {
            return Ok(RenderResult::default());
        };

        for item in &page.items {
            match item {
                Primitive::Text(text) => draw_text(context, &area, text)?,
                Primitive::Rect(rect) => draw_rect(&area, rect),
                Primitive::Token(token) => draw_token(&area, token),
                Primitive::Image(logo) => draw_image(context, &area, logo),
            }
        }

        self.next += 1;
        Ok(RenderResult {
            size: area.size(),
            has_more: self.next < self.pages.len(),
        })
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn draw_text(context: &Context, area: &Area<'_>, text: &TextBox) -> Result<(), GenPdfError> {
    let mut base = Style::new().with_font_size(text.size);
    if text.bold {
        base.set_bold();
    }
    if text.italic {
        base.set_italic();
    }

    let widths: Vec<Mm> = text
        .runs
        .iter()
        .map(|run| base.str_width(&context.font_cache, &run.text))
        .collect();
    let mut x = Mm::from(text.x);
    if text.anchor == Anchor::Center {
        let total: Mm = widths.iter().copied().sum();
        x -= total / 2.0;
    }

    for (run, width) in text.runs.iter().zip(widths) {
        let style = base.with_color(color(run.color));
        area.print_str(&context.font_cache, Position::new(x, text.top), style, &run.text)?;
        x += width;
    }
    Ok(())
}

fn draw_rect(area: &Area<'_>, rect: &RectBox) {
    if let Some(fill) = rect.fill {
        // a line as thick as the rectangle is tall fills it
        let mid = rect.y + rect.height / 2.0;
        area.draw_line(
            vec![Position::new(rect.x, mid), Position::new(rect.x + rect.width, mid)],
            LineStyle::new().with_thickness(rect.height).with_color(color(fill)),
        );
    }
    if let Some(stroke) = rect.stroke {
        outline(area, rect.x, rect.y, rect.width, rect.height, rect.stroke_width, stroke);
    }
}

fn outline(area: &Area<'_>, x: f64, y: f64, w: f64, h: f64, thickness: f64, rgb: Rgb) {
    area.draw_line(
        vec![
            Position::new(x, y),
            Position::new(x + w, y),
            Position::new(x + w, y + h),
            Position::new(x, y + h),
            Position::new(x, y),
        ],
        LineStyle::new().with_thickness(thickness).with_color(color(rgb)),
    );
}

/// Embeds the image stretched to its box; a broken image is skipped.
fn draw_image(context: &Context, area: &Area<'_>, logo: &ImageBox) {
    if let Err(err) = embed_image(context, area, logo) {
        tracing::warn!("logo not drawable: {}", err);
    }
}

fn embed_image(context: &Context, area: &Area<'_>, logo: &ImageBox) -> Result<(), String> {
    let bytes = png_bytes(&logo.source).ok_or("logo is not a png data url")?;
    let (px_width, px_height) = image::load_from_memory(&bytes)
        .map(|img| (img.width(), img.height()))
        .map_err(|e| e.to_string())?;

    let natural = |px: u32| f64::from(px) * 25.4 / IMAGE_DPI;
    let mut element = Image::from_reader(std::io::Cursor::new(bytes))
        .map_err(|e| e.to_string())?
        .with_position(Position::new(logo.x, logo.y))
        .with_scale(Scale::new(
            logo.width / natural(px_width),
            logo.height / natural(px_height),
        ));
    element
        .render(context, area.clone(), Style::new())
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Draws the token as vector modules; an unreadable token leaves an empty frame.
fn draw_token(area: &Area<'_>, token: &TokenBox) {
    let grid = match decode_modules(&token.source) {
        Ok(grid) => grid,
        Err(err) => {
            tracing::warn!("token not drawable: {}", err);
            outline(area, token.x, token.y, token.size, token.size, 0.3, BORDER);
            return;
        }
    };

    let module = token.size / grid.width_with_margin() as f64;
    let origin_x = token.x + grid.margin() as f64 * module;
    let origin_y = token.y + grid.margin() as f64 * module;

    for row in 0..grid.width() {
        let mid = origin_y + (row as f64 + 0.5) * module;
        let mut col = 0;
        while col < grid.width() {
            if !grid.is_dark(col, row) {
                col += 1;
                continue;
            }
            let start = col;
            while col < grid.width() && grid.is_dark(col, row) {
                col += 1;
            }
            area.draw_line(
                vec![
                    Position::new(origin_x + start as f64 * module, mid),
                    Position::new(origin_x + col as f64 * module, mid),
                ],
                LineStyle::new().with_thickness(module).with_color(Color::Rgb(0, 0, 0)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Certificate, DeutschLevel};
    use crate::layout::{render, Branding};
    use crate::qr::generate_qr_code;
    use chrono::Utc;
    use uuid::Uuid;

    fn document() -> Document {
        let now = Utc::now();
        let certificate = Certificate {
            id: Uuid::new_v4(),
            certificate_code: "CERT-TEST-0001".to_string(),
            recipient_name: "NIYOMUGABO Adelite".to_string(),
            recipient_email: "a@x.com".to_string(),
            deutschlevel: Some(DeutschLevel::B1),
            geburtstag: None,
            geburtsort: None,
            pruefungsdatum: Some("2025-10-26".to_string()),
            pruefungsort: Some("Kigali".to_string()),
            hoeren: Some(80),
            lesen: Some(63),
            schreiben: Some(70),
            sprechen: Some(60),
            qr_code_url: generate_qr_code("https://example.com/verify/CERT-TEST-0001").unwrap(),
            is_active: true,
            issue_date: now,
            created_at: now,
            updated_at: now,
        };
        let branding = Branding {
            city: "Kigali".to_string(),
            verification_host: "example.com".to_string(),
            contact_email: "office@example.com".to_string(),
            logo: None,
        };
        render(&certificate, &branding)
    }

    #[test]
    fn missing_font_dir_falls_back_or_reports() {
        match load_fonts(Some(Path::new("/nonexistent/fonts"))) {
            Ok(_) => {}
            Err(err) => assert!(matches!(err, PdfError::FontsMissing)),
        }
    }

    #[test]
    fn renders_pdf_bytes_when_fonts_are_installed() {
        let Ok(fonts) = load_fonts(None) else {
            eprintln!("skipping: no system fonts");
            return;
        };
        let bytes = render_pdf(&document(), fonts).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn broken_logo_does_not_fail_the_document() {
        let Ok(fonts) = load_fonts(None) else {
            eprintln!("skipping: no system fonts");
            return;
        };
        let mut doc = document();
        for page in doc.pages.iter_mut() {
            page.items.push(Primitive::Image(ImageBox {
                x: 160.0,
                y: 25.0,
                width: 35.0,
                height: 35.0,
                source: "data:image/png;base64,bm90IGEgcG5n".to_string(),
            }));
        }
        let bytes = render_pdf(&doc, fonts).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
