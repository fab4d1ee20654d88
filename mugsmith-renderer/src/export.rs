//! Scene export to encoded image artifacts.
//!
//! Decodes every image source, composites the scene at a fixed output
//! resolution and encodes the surface to PNG, JPEG or WebP.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageEncoder;
use mugsmith_core::{Scene, TextBoxMetrics};
use tiny_skia::Pixmap;

use crate::compose::Compositor;
use crate::decode::decode_scene_images;
use crate::error::{RenderError, RenderResult};
use crate::fonts::FontBook;

/// Output resolutions offered for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportResolution {
    /// 800x600.
    Svga,
    /// 1024x768.
    Xga,
    /// 1280x720.
    Hd,
    /// 1920x1080.
    #[default]
    FullHd,
    /// 2560x1440.
    Qhd,
    /// 3840x2160.
    Uhd,
}

impl ExportResolution {
    /// Every resolution, smallest first.
    pub const ALL: [Self; 6] = [
        Self::Svga,
        Self::Xga,
        Self::Hd,
        Self::FullHd,
        Self::Qhd,
        Self::Uhd,
    ];

    /// Width and height in pixels.
    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Svga => (800, 600),
            Self::Xga => (1024, 768),
            Self::Hd => (1280, 720),
            Self::FullHd => (1920, 1080),
            Self::Qhd => (2560, 1440),
            Self::Uhd => (3840, 2160),
        }
    }
}

impl fmt::Display for ExportResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{w}x{h}")
    }
}

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    /// PNG image. Lossless.
    #[default]
    Png,
    /// JPEG image. Alpha is flattened onto white.
    Jpeg,
    /// WebP image. Lossy below full quality, lossless at 1.0.
    WebP,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::WebP => "webp",
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportConfig {
    /// Output resolution.
    pub resolution: ExportResolution,
    /// Output format.
    pub format: ExportFormat,
    /// Encoder quality in `[0, 1]`. PNG ignores it.
    pub quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resolution: ExportResolution::default(),
            format: ExportFormat::default(),
            quality: 0.92,
        }
    }
}

/// An encoded export ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested download name.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// Encoded image.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Wrap an encoded PNG produced by the image generation step.
    #[must_use]
    pub fn magic_image(bytes: Vec<u8>) -> Self {
        Self {
            file_name: magic_image_file_name(),
            mime_type: ExportFormat::Png.mime_type().to_string(),
            bytes,
        }
    }

    /// Write the artifact into `dir` under its file name.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the file cannot be written.
    pub fn save_to(&self, dir: &Path) -> RenderResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "export saved");
        Ok(path)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// `export-<unix millis>.<ext>`
#[must_use]
pub fn export_file_name(format: ExportFormat) -> String {
    format!("export-{}.{}", unix_millis(), format.extension())
}

/// `magic-image-<unix millis>.png`
#[must_use]
pub fn magic_image_file_name() -> String {
    format!("magic-image-{}.png", unix_millis())
}

/// Exports a [`Scene`] to an encoded image.
#[derive(Debug, Clone)]
pub struct SceneExporter {
    config: ExportConfig,
    fonts: Arc<FontBook>,
    metrics: TextBoxMetrics,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig, fonts: Arc<FontBook>) -> Self {
        Self {
            config,
            fonts,
            metrics: TextBoxMetrics::default(),
        }
    }

    /// Create an exporter with default configuration and system fonts.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default(), Arc::new(FontBook::system()))
    }

    /// Override text box padding and line height.
    #[must_use]
    pub fn with_metrics(mut self, metrics: TextBoxMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Decode all images, then composite the scene at the configured
    /// resolution.
    ///
    /// Images that fail to decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated or the background
    /// color is invalid.
    pub async fn render(&self, scene: &Scene) -> RenderResult<Pixmap> {
        let images = decode_scene_images(scene).await;
        let (width, height) = self.config.resolution.dimensions();
        Compositor::new(&self.fonts)
            .with_metrics(self.metrics)
            .render(scene, &images, width, height)
    }

    /// Render and encode the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails. No partial artifact
    /// is produced.
    pub async fn export(&self, scene: &Scene) -> RenderResult<ExportArtifact> {
        let pixmap = self.render(scene).await?;
        let format = self.config.format;
        let bytes = encode(&pixmap, format, self.config.quality)?;
        let artifact = ExportArtifact {
            file_name: export_file_name(format),
            mime_type: format.mime_type().to_string(),
            bytes,
        };
        tracing::info!(
            file = %artifact.file_name,
            resolution = %self.config.resolution,
            bytes = artifact.bytes.len(),
            "scene exported"
        );
        Ok(artifact)
    }

    /// Export the scene and hand the artifact to `deliver`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails; `deliver` is not
    /// called in that case.
    pub async fn export_with<F, R>(&self, scene: &Scene, deliver: F) -> RenderResult<R>
    where
        F: FnOnce(ExportArtifact) -> R,
    {
        let artifact = self.export(scene).await?;
        Ok(deliver(artifact))
    }
}

/// Encode a surface.
///
/// PNG is lossless and ignores `quality`. JPEG maps `quality` from `[0, 1]`
/// to `1..=100`. WebP is lossy at the same scale and switches to lossless
/// at full quality.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if the encoder fails.
pub fn encode(pixmap: &Pixmap, format: ExportFormat, quality: f32) -> RenderResult<Vec<u8>> {
    match format {
        ExportFormat::Png => pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}"))),
        ExportFormat::Jpeg => encode_jpeg(pixmap, jpeg_quality(quality)),
        ExportFormat::WebP => encode_webp(pixmap, unit_quality(quality)),
    }
}

/// Quality clamped to `[0, 1]`; non-finite input gets the default.
fn unit_quality(quality: f32) -> f32 {
    let quality = if quality.is_finite() { quality } else { 0.92 };
    quality.clamp(0.0, 1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> u8 {
    ((unit_quality(quality) * 100.0).round() as u8).max(1)
}

/// Straight (non-premultiplied) RGBA bytes of a surface.
fn demultiplied(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> RenderResult<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    // Premultiplied over white: c + (1 - a) * 255
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let inv = 255 - u16::from(px.alpha());
        rgb.push((u16::from(px.red()) + inv).min(255) as u8);
        rgb.push((u16::from(px.green()) + inv).min(255) as u8);
        rgb.push((u16::from(px.blue()) + inv).min(255) as u8);
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

fn encode_webp(pixmap: &Pixmap, quality: f32) -> RenderResult<Vec<u8>> {
    let rgba = demultiplied(pixmap);
    if quality < 1.0 {
        let memory = webp::Encoder::from_rgba(&rgba, pixmap.width(), pixmap.height())
            .encode_simple(false, quality * 100.0)
            .map_err(|e| RenderError::Export(format!("WebP encoding failed: {e:?}")))?;
        return Ok(memory.to_vec());
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
        .write_image(
            &rgba,
            pixmap.width(),
            pixmap.height(),
            image::ColorType::Rgba8.into(),
        )
        .map_err(|e| RenderError::Export(format!("WebP encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn half_transparent() -> Pixmap {
        let mut pixmap = Pixmap::new(4, 4).expect("pixmap");
        pixmap.fill(Color::from_rgba8(0, 0, 0, 128));
        pixmap
    }

    #[test]
    fn test_resolution_table() {
        assert_eq!(ExportResolution::default().dimensions(), (1920, 1080));
        assert_eq!(ExportResolution::ALL[0].dimensions(), (800, 600));
        assert_eq!(ExportResolution::ALL[5].to_string(), "3840x2160");
        let areas: Vec<u32> = ExportResolution::ALL
            .iter()
            .map(|r| r.dimensions().0 * r.dimensions().1)
            .collect();
        assert!(areas.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.format, ExportFormat::Png);
        assert!((config.quality - 0.92).abs() < f32::EPSILON);
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(7.5), 100);
        assert_eq!(jpeg_quality(-1.0), 1);
        assert_eq!(jpeg_quality(f32::NAN), 92);
    }

    #[test]
    fn test_file_names() {
        let name = export_file_name(ExportFormat::Jpeg);
        let stamp = name
            .strip_prefix("export-")
            .and_then(|rest| rest.strip_suffix(".jpeg"))
            .expect("pattern");
        assert!(stamp.parse::<u128>().is_ok());

        let magic = magic_image_file_name();
        assert!(magic.starts_with("magic-image-"));
        assert!(magic.ends_with(".png"));
    }

    #[test]
    fn test_png_encoding() {
        let bytes = encode(&half_transparent(), ExportFormat::Png, 0.1).expect("png");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_jpeg_flattens_onto_white() {
        let bytes = encode(&half_transparent(), ExportFormat::Jpeg, 1.0).expect("jpeg");
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);

        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgb8();
        let px = decoded.get_pixel(1, 1);
        // Black at ~50% alpha over white lands near mid grey
        assert!((115..=140).contains(&px[0]), "got {px:?}");
    }

    /// Deterministic opaque noise, hard to compress.
    fn noise(size: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(size, size).expect("pixmap");
        let mut state: u32 = 0x1234_5678;
        for px in pixmap.pixels_mut() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [r, g, b, _] = state.to_le_bytes();
            *px = tiny_skia::PremultipliedColorU8::from_rgba(r, g, b, 255).expect("opaque");
        }
        pixmap
    }

    #[test]
    fn test_webp_quality_controls_size() {
        let pixmap = noise(64);
        let low = encode(&pixmap, ExportFormat::WebP, 0.1).expect("low");
        let high = encode(&pixmap, ExportFormat::WebP, 0.9).expect("high");
        assert_eq!(&low[..4], b"RIFF");
        assert_eq!(&low[8..12], b"WEBP");
        assert!(low.len() < high.len(), "{} >= {}", low.len(), high.len());

        let decoded = image::load_from_memory(&low).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_webp_full_quality_is_lossless() {
        let mut pixmap = Pixmap::new(3, 2).expect("pixmap");
        pixmap.fill(Color::from_rgba8(200, 100, 50, 255));
        let bytes = encode(&pixmap, ExportFormat::WebP, 1.0).expect("webp");
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");

        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded.get_pixel(2, 1).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_magic_image_artifact() {
        let artifact = ExportArtifact::magic_image(vec![1, 2, 3]);
        assert_eq!(artifact.mime_type, "image/png");
        assert!(artifact.file_name.starts_with("magic-image-"));
    }
}
