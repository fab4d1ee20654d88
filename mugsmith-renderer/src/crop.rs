//! Crop-to-texture for the 3D mug preview.

use mugsmith_core::CropRect;

use crate::error::RenderResult;
use crate::texture::{decode_image, resize_to_fit, TextureData};

/// Cut `crop` out of `texture`.
///
/// Any failure is logged and yields the uncropped texture.
#[must_use]
pub fn crop_texture(texture: &TextureData, crop: &CropRect) -> TextureData {
    let region = match crop.to_pixels(texture.width, texture.height) {
        Ok(region) => region,
        Err(e) => {
            tracing::warn!(error = %e, "invalid crop, using full image");
            return texture.clone();
        }
    };
    let Some(source) = texture.to_rgba_image() else {
        tracing::warn!(
            width = texture.width,
            height = texture.height,
            "texture buffer does not match its size, using full image"
        );
        return texture.clone();
    };

    let cropped =
        image::imageops::crop_imm(&source, region.x, region.y, region.width, region.height)
            .to_image();
    tracing::debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "texture cropped"
    );
    TextureData::from_rgba(cropped, texture.format)
}

/// Decode `bytes`, crop them and downscale so neither side exceeds
/// `max_side`.
///
/// # Errors
///
/// Returns an error only when the source cannot be decoded at all; crop
/// problems fall back to the full image.
pub fn crop_to_texture(bytes: &[u8], crop: &CropRect, max_side: u32) -> RenderResult<TextureData> {
    let texture = decode_image(bytes)?;
    let cropped = crop_texture(&texture, crop);
    Ok(resize_to_fit(&cropped, max_side, max_side).unwrap_or(cropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ImageFormat;

    /// 4x2 texture: left half red, right half blue.
    fn split_texture() -> TextureData {
        let img = image::RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        TextureData::from_rgba(img, ImageFormat::Png)
    }

    #[test]
    fn test_crop_right_half() {
        let out = crop_texture(&split_texture(), &CropRect::new(50.0, 0.0, 50.0, 100.0));
        assert_eq!((out.width, out.height), (2, 2));
        assert!(out.data.chunks_exact(4).all(|px| px == [0, 0, 255, 255]));
    }

    #[test]
    fn test_invalid_crop_falls_back() {
        let texture = split_texture();
        let out = crop_texture(&texture, &CropRect::new(120.0, 0.0, 10.0, 10.0));
        assert_eq!((out.width, out.height), (4, 2));
        assert_eq!(out.data, texture.data);
    }

    #[test]
    fn test_crop_to_texture_downscales() {
        let img = image::RgbaImage::from_pixel(64, 32, image::Rgba([9, 9, 9, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).expect("encode");

        let out = crop_to_texture(&bytes.into_inner(), &CropRect::FULL, 16).expect("texture");
        assert_eq!((out.width, out.height), (16, 8));
    }

    #[test]
    fn test_crop_to_texture_rejects_garbage() {
        assert!(crop_to_texture(b"nope", &CropRect::FULL, 16).is_err());
    }
}
