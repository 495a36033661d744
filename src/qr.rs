//! Verification token: the QR image embedding a certificate's verification URL.

use base64::{engine::general_purpose, Engine as _};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
/// Pixels per QR module.
const MODULE_PX: u32 = 8;
/// Light border around the symbol, in modules.
const MARGIN_MODULES: u32 = 2;
const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("cannot encode an empty string")]
    Empty,
    #[error("qr encoding failed: {0}")]
    Qr(String),
    #[error("png encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("token is not a png data url")]
    NotDataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token image has unexpected geometry {0}x{1}")]
    Geometry(u32, u32),
}

/// Square grid of QR modules, `true` meaning dark. Excludes the margin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    width: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }

    /// Width of the symbol including the light margin on both sides.
    pub fn width_with_margin(&self) -> usize {
        self.width + 2 * MARGIN_MODULES as usize
    }

    pub fn margin(&self) -> usize {
        MARGIN_MODULES as usize
    }

    fn from_code(code: &QrCode) -> Self {
        Self {
            width: code.width(),
            modules: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        }
    }
}

fn encode_modules(data: &str) -> Result<QrCode, EncodingError> {
    if data.is_empty() {
        return Err(EncodingError::Empty);
    }
    QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| EncodingError::Qr(e.to_string()))
}

/// Encodes `data` as a dark-on-light PNG QR image, returned as a data URL.
pub fn generate_qr_code(data: &str) -> Result<String, EncodingError> {
    let code = encode_modules(data)?;
    let grid = ModuleGrid::from_code(&code);

    let side = grid.width_with_margin() as u32 * MODULE_PX;
    let img = GrayImage::from_fn(side, side, |px, py| {
        let mx = (px / MODULE_PX) as i64 - MARGIN_MODULES as i64;
        let my = (py / MODULE_PX) as i64 - MARGIN_MODULES as i64;
        let inside = (0..grid.width() as i64).contains(&mx) && (0..grid.width() as i64).contains(&my);
        if inside && grid.is_dark(mx as usize, my as usize) {
            DARK
        } else {
            LIGHT
        }
    });

    let mut png_bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut png_bytes, ImageFormat::Png)?;

    let encoded = general_purpose::STANDARD.encode(png_bytes.into_inner());
    Ok(format!("{}{}", DATA_URL_PREFIX, encoded))
}

/// Reads the module grid back out of a token produced by [`generate_qr_code`].
pub fn decode_modules(data_url: &str) -> Result<ModuleGrid, EncodingError> {
    let payload = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or(EncodingError::NotDataUrl)?;
    let bytes = general_purpose::STANDARD.decode(payload)?;
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?.to_luma8();

    let (w, h) = img.dimensions();
    if w != h || w % MODULE_PX != 0 || w / MODULE_PX <= 2 * MARGIN_MODULES {
        return Err(EncodingError::Geometry(w, h));
    }

    let width = (w / MODULE_PX - 2 * MARGIN_MODULES) as usize;
    let mut modules = Vec::with_capacity(width * width);
    for my in 0..width as u32 {
        for mx in 0..width as u32 {
            let cx = (mx + MARGIN_MODULES) * MODULE_PX + MODULE_PX / 2;
            let cy = (my + MARGIN_MODULES) * MODULE_PX + MODULE_PX / 2;
            modules.push(img.get_pixel(cx, cy).0[0] < 128);
        }
    }

    Ok(ModuleGrid { width, modules })
}

/// Module grid that `data` encodes to, for comparing against a stored token.
#[cfg(test)]
pub fn expected_modules(data: &str) -> Result<ModuleGrid, EncodingError> {
    encode_modules(data).map(|code| ModuleGrid::from_code(&code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://certificate.kigalideutschacademy.com/verify/CERT-MH6Y1Z2K-4QX0T9AB";

    #[test]
    fn produces_png_data_url() {
        let token = generate_qr_code(URL).unwrap();
        assert!(token.starts_with(DATA_URL_PREFIX));

        let bytes = general_purpose::STANDARD
            .decode(&token[DATA_URL_PREFIX.len()..])
            .unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(generate_qr_code(URL).unwrap(), generate_qr_code(URL).unwrap());
    }

    #[test]
    fn decoded_modules_match_input() {
        let token = generate_qr_code(URL).unwrap();
        let grid = decode_modules(&token).unwrap();
        assert_eq!(grid, expected_modules(URL).unwrap());
        assert_ne!(grid, expected_modules("https://example.com/verify/OTHER").unwrap());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(generate_qr_code(""), Err(EncodingError::Empty)));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let huge = "X".repeat(5000);
        assert!(matches!(generate_qr_code(&huge), Err(EncodingError::Qr(_))));
    }

    #[test]
    fn foreign_data_urls_are_rejected() {
        assert!(matches!(
            decode_modules("https://example.com/qr.png"),
            Err(EncodingError::NotDataUrl)
        ));
    }
}
