//! Image source loading and decoding.
//!
//! A meme starts from a raster image that can arrive several ways:
//! a template file on disk, raw uploaded bytes, a `data:` URI, or an
//! `http(s)` URL. All of them funnel into [`ImageHandle`], the decoded
//! image the store owns. Decoding is the only fallible step that
//! happens before the store commits a replacement, so a failed load
//! never disturbs existing annotations.

use std::io::Read;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbaImage;

use crate::error::{MemeError, Result};

/// Cap on remote image downloads (32 MiB).
const MAX_FETCH_BYTES: u64 = 32 * 1024 * 1024;

/// A decoded raster image with known natural dimensions.
///
/// The handle is opaque to the store: it only exposes the pixel data
/// to the renderer and its natural width/height for coordinate
/// conversion.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    image: RgbaImage,
}

impl ImageHandle {
    /// Wrap an already-decoded image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// True decoded pixel width, independent of display scaling.
    pub fn natural_width(&self) -> u32 {
        self.image.width()
    }

    /// True decoded pixel height, independent of display scaling.
    pub fn natural_height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the decoded pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Load and decode an image from a source string.
///
/// Dispatches on the source form: `data:` URIs are decoded inline,
/// `http(s)` URLs are fetched, anything else is treated as a file path.
pub fn load(source: &str) -> Result<ImageHandle> {
    if source.starts_with("data:") {
        from_data_uri(source)
    } else if source.starts_with("http://") || source.starts_with("https://") {
        from_url(source)
    } else {
        from_path(source)
    }
}

/// Decode an image from raw bytes (e.g. an uploaded file).
pub fn from_bytes(data: &[u8]) -> Result<ImageHandle> {
    if !looks_like_image(data) {
        return Err(MemeError::ImageLoad {
            message: "unrecognized image format".to_string(),
        });
    }

    let image = image::load_from_memory(data)
        .map_err(|e| MemeError::ImageLoad {
            message: format!("failed to decode image: {e}"),
        })?
        .to_rgba8();

    log::trace!("decoded {}x{} image", image.width(), image.height());
    Ok(ImageHandle::from_image(image))
}

/// Decode an image from a file on disk.
pub fn from_path(path: impl AsRef<Path>) -> Result<ImageHandle> {
    let data = std::fs::read(path.as_ref())?;
    from_bytes(&data)
}

/// Decode an image from a `data:` URI (base64 payload).
fn from_data_uri(uri: &str) -> Result<ImageHandle> {
    let payload = uri
        .split_once(',')
        .filter(|(header, _)| header.contains(";base64"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| MemeError::ImageLoad {
            message: "malformed data URI (expected base64 payload)".to_string(),
        })?;

    let data = STANDARD.decode(payload).map_err(|e| MemeError::ImageLoad {
        message: format!("invalid base64 in data URI: {e}"),
    })?;
    from_bytes(&data)
}

/// Fetch and decode an image from an `http(s)` URL.
fn from_url(url: &str) -> Result<ImageHandle> {
    let response = ureq::get(url)
        .set("User-Agent", "memely")
        .call()
        .map_err(|e| MemeError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let mut data = Vec::new();
    response
        .into_reader()
        .take(MAX_FETCH_BYTES)
        .read_to_end(&mut data)
        .map_err(|e| MemeError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    log::debug!("fetched {} bytes from {}", data.len(), url);
    from_bytes(&data)
}

/// Check common image magic bytes before attempting a full decode.
fn looks_like_image(data: &[u8]) -> bool {
    if data.len() < 8 {
        return false;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return true;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return true;
    }

    // BMP: 42 4D (BM)
    if data.starts_with(&[0x42, 0x4D]) {
        return true;
    }

    // TIFF: 49 49 2A 00 (little endian) or 4D 4D 00 2A (big endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return true;
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(&[0x52, 0x49, 0x46, 0x46]) && &data[8..12] == b"WEBP" {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut data = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut data),
            image::ImageFormat::Png,
        )
        .expect("png encode");
        data
    }

    #[test]
    fn test_magic_detection_png() {
        let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(looks_like_image(&png_magic));
    }

    #[test]
    fn test_magic_detection_invalid() {
        let random_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(!looks_like_image(&random_data));
    }

    #[test]
    fn test_from_bytes_decodes_dimensions() {
        let handle = from_bytes(&png_bytes(64, 48)).expect("decode");
        assert_eq!(handle.natural_width(), 64);
        assert_eq!(handle.natural_height(), 48);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, MemeError::ImageLoad { .. }));
    }

    #[test]
    fn test_data_uri_round_trip() {
        let encoded = STANDARD.encode(png_bytes(8, 8));
        let uri = format!("data:image/png;base64,{encoded}");
        let handle = load(&uri).expect("decode data uri");
        assert_eq!(handle.natural_width(), 8);
    }

    #[test]
    fn test_data_uri_without_base64_marker() {
        let err = load("data:image/png,rawpayload").unwrap_err();
        assert!(matches!(err, MemeError::ImageLoad { .. }));
    }
}
