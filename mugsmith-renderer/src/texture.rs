//! Image decoding and texture utilities.
//!
//! Sources arrive as raw bytes (uploads, fetched generations) or as data URIs.
//! Everything decodes to straight-alpha RGBA; the compositor converts to a
//! premultiplied surface on demand.

use base64::Engine;
use tiny_skia::{ColorU8, IntSize, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Decoded image pixels.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, straight alpha).
    pub data: Vec<u8>,
    /// Format the pixels were decoded from.
    pub format: ImageFormat,
}

impl TextureData {
    /// Wrap an `image` RGBA buffer.
    #[must_use]
    pub fn from_rgba(image: image::RgbaImage, format: ImageFormat) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
            format,
        }
    }

    /// View the pixels as an `image` buffer.
    ///
    /// Returns `None` if `data` does not match the dimensions.
    #[must_use]
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Premultiply into a raster surface for drawing.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] for empty or inconsistent textures.
    pub fn to_pixmap(&self) -> RenderResult<Pixmap> {
        let size = IntSize::from_wh(self.width, self.height).ok_or_else(|| {
            RenderError::Surface(format!("empty texture {}x{}", self.width, self.height))
        })?;
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(RenderError::Surface(format!(
                "texture has {} bytes, expected {expected}",
                self.data.len()
            )));
        }

        let mut premultiplied = Vec::with_capacity(expected);
        for px in self.data.chunks_exact(4) {
            let color = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            premultiplied.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        Pixmap::from_vec(premultiplied, size)
            .ok_or_else(|| RenderError::Surface("failed to wrap texture".to_string()))
    }
}

/// Source image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF, first frame only.
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            "gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            Self::WebP
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Unknown
        }
    }

    /// Sniff the bytes, falling back to a declared MIME type.
    #[must_use]
    pub fn detect(data: &[u8], mime_hint: Option<&str>) -> Self {
        match Self::from_magic_bytes(data) {
            Self::Unknown => mime_hint.map_or(Self::Unknown, Self::from_mime),
            format => format,
        }
    }
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the bytes are not a decodable image.
pub fn decode_image(data: &[u8]) -> RenderResult<TextureData> {
    decode_image_with_hint(data, None)
}

/// Decode an image, using `mime_hint` to label the format when the bytes
/// carry no recognizable signature.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the bytes are not a decodable image.
pub fn decode_image_with_hint(data: &[u8], mime_hint: Option<&str>) -> RenderResult<TextureData> {
    let format = ImageFormat::detect(data, mime_hint);
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode {format:?} image: {e}")))?;
    Ok(TextureData::from_rgba(img.to_rgba8(), format))
}

/// Extract the payload of a data URI.
///
/// Supports base64 (`data:image/png;base64,...`) and percent-encoded payloads.
/// Returns the declared media type alongside the bytes.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed.
pub fn data_uri_bytes(uri: &str) -> RenderResult<(Option<String>, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let mut parts = metadata.split(';');
    let media_type = parts
        .next()
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(payload)?
    };
    Ok((media_type, bytes))
}

/// Decode an image from a data URI.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed or the payload
/// is not a decodable image.
pub fn decode_data_uri(uri: &str) -> RenderResult<TextureData> {
    let (media_type, bytes) = data_uri_bytes(uri)?;
    decode_image_with_hint(&bytes, media_type.as_deref())
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Downscale to fit within max dimensions, preserving aspect ratio.
///
/// Returns `None` if the image already fits.
#[must_use]
pub fn resize_to_fit(texture: &TextureData, max_width: u32, max_height: u32) -> Option<TextureData> {
    if texture.width <= max_width && texture.height <= max_height {
        return None;
    }

    let scale = (f64::from(max_width) / f64::from(texture.width))
        .min(f64::from(max_height) / f64::from(texture.height));

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let new_width = ((f64::from(texture.width) * scale) as u32).max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let new_height = ((f64::from(texture.height) * scale) as u32).max(1);

    let img = texture.to_rgba_image()?;
    let resized = image::imageops::resize(
        &img,
        new_width,
        new_height,
        image::imageops::FilterType::Lanczos3,
    );
    Some(TextureData::from_rgba(resized, texture.format))
}
