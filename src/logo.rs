//! School logo printed in the page header.

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("cannot read logo: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode logo: {0}")]
    Image(#[from] image::ImageError),
}

/// Loads the PNG at `path` and returns it as an opaque PNG data URL.
///
/// Transparent pixels are composited onto white; the PDF writer cannot embed
/// an alpha channel.
pub fn load_logo(path: &Path) -> Result<String, LogoError> {
    let bytes = std::fs::read(path)?;
    let rgba = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?.to_rgba8();

    let flat = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((u16::from(c) * u16::from(a) + 255 * (255 - u16::from(a))) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    });

    let mut png_bytes = std::io::Cursor::new(Vec::new());
    flat.write_to(&mut png_bytes, ImageFormat::Png)?;

    let encoded = general_purpose::STANDARD.encode(png_bytes.into_inner());
    Ok(format!("{}{}", DATA_URL_PREFIX, encoded))
}

/// Raw PNG bytes behind a data URL built by [`load_logo`].
pub fn png_bytes(data_url: &str) -> Option<Vec<u8>> {
    let payload = data_url.strip_prefix(DATA_URL_PREFIX)?;
    general_purpose::STANDARD.decode(payload).ok()
}
