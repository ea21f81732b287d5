//! QR code rendering.
//!
//! Encodes a string as a QR code, rasterizes it to a grayscale PNG and wraps
//! the PNG in a `data:` URL so it can be embedded directly in an `<img>` tag.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

use crate::errors::{Error, Result};

/// Minimum edge length of the rendered image, in pixels.
const MIN_DIMENSION: u32 = 200;

/// Render `content` as a PNG QR code.
pub fn png(content: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(content.as_bytes()).map_err(|e| Error::Encoding { message: e.to_string() })?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| Error::Encoding { message: e.to_string() })?;
    Ok(buffer)
}

/// Render `content` as a PNG QR code wrapped in a `data:image/png;base64,` URL.
pub fn data_url(content: &str) -> Result<String> {
    let png = png(content)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// HTML fragment embedding a QR code image for a download link.
pub fn img_fragment(data_url: &str) -> String {
    format!("<img src='{data_url}' alt='QR Code for download' />")
}
