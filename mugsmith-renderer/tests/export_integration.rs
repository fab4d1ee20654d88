//! Integration tests for scene export (mugsmith-renderer).
//!
//! Covers decode fan-in, letterboxing, deterministic output, encoded
//! formats and saving artifacts.

use std::sync::Arc;

use mugsmith_core::{Point, Scene, Size, TextAlign, TextStyle};
use mugsmith_renderer::{
    ExportArtifact, ExportConfig, ExportFormat, ExportResolution, FontBook, SceneExporter,
};

fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn exporter(resolution: ExportResolution, format: ExportFormat) -> SceneExporter {
    let config = ExportConfig {
        resolution,
        format,
        ..ExportConfig::default()
    };
    SceneExporter::new(config, Arc::new(FontBook::from_font_data(Vec::new())))
}

fn pixel(bytes: &[u8], x: u32, y: u32) -> [u8; 4] {
    let decoded = image::load_from_memory(bytes).expect("decode").to_rgba8();
    decoded.get_pixel(x, y).0
}

fn place(scene: &mut Scene, bytes: Vec<u8>, x: f32, y: f32) {
    let handle = scene.load_image(bytes, Some("image/png".into()));
    scene
        .add_image(handle, Point::new(x, y), Size::new(200.0, 150.0))
        .expect("add image");
}

// ==========================================================================
// Decode fan-in
// ==========================================================================

#[tokio::test]
async fn test_failed_decode_skips_only_that_image() {
    let mut scene = Scene::new(800.0, 600.0);
    place(&mut scene, solid_png([255, 0, 0]), 0.0, 0.0);
    place(&mut scene, solid_png([0, 255, 0]), 300.0, 0.0);
    place(&mut scene, b"not an image".to_vec(), 600.0, 0.0);

    let artifact = exporter(ExportResolution::Svga, ExportFormat::Png)
        .export(&scene)
        .await
        .expect("export still succeeds");

    assert_eq!(pixel(&artifact.bytes, 100, 75), [255, 0, 0, 255]);
    assert_eq!(pixel(&artifact.bytes, 400, 75), [0, 255, 0, 255]);
    assert_eq!(pixel(&artifact.bytes, 700, 75), [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_empty_scene_exports_background() {
    let mut scene = Scene::new(800.0, 600.0);
    scene.set_background_color("#336699").expect("color");

    let artifact = exporter(ExportResolution::Svga, ExportFormat::Png)
        .export(&scene)
        .await
        .expect("export");
    assert_eq!(pixel(&artifact.bytes, 0, 0), [0x33, 0x66, 0x99, 255]);
    assert_eq!(pixel(&artifact.bytes, 799, 599), [0x33, 0x66, 0x99, 255]);
}

// ==========================================================================
// Layout and determinism
// ==========================================================================

#[tokio::test]
async fn test_letterbox_bands_use_background() {
    let mut scene = Scene::new(800.0, 600.0);
    let handle = scene.load_image(solid_png([0, 0, 255]), None);
    scene
        .add_image(handle, Point::new(0.0, 0.0), Size::new(800.0, 600.0))
        .expect("add image");

    let exporter = exporter(ExportResolution::FullHd, ExportFormat::Png);
    let pixmap = exporter.render(&scene).await.expect("render");
    assert_eq!((pixmap.width(), pixmap.height()), (1920, 1080));

    let artifact = exporter.export(&scene).await.expect("export");
    // scale 1.8, offset_x 240, offset_y 0
    assert_eq!(pixel(&artifact.bytes, 100, 540), [255, 255, 255, 255]);
    assert_eq!(pixel(&artifact.bytes, 239, 540), [255, 255, 255, 255]);
    assert_eq!(pixel(&artifact.bytes, 960, 540), [0, 0, 255, 255]);
    assert_eq!(pixel(&artifact.bytes, 960, 0), [0, 0, 255, 255]);
    assert_eq!(pixel(&artifact.bytes, 1700, 540), [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_repeated_exports_are_identical() {
    let mut scene = Scene::new(800.0, 600.0);
    place(&mut scene, solid_png([200, 10, 10]), 10.0, 10.0);
    place(&mut scene, solid_png([10, 200, 10]), 100.0, 80.0);
    place(&mut scene, solid_png([10, 10, 200]), 180.0, 140.0);

    let exporter = exporter(ExportResolution::Xga, ExportFormat::Png);
    let first = exporter.render(&scene).await.expect("first");
    let second = exporter.render(&scene).await.expect("second");
    assert_eq!(first.data(), second.data());
}

#[tokio::test]
async fn test_z_order_topmost_wins() {
    let mut scene = Scene::new(800.0, 600.0);
    place(&mut scene, solid_png([255, 0, 0]), 100.0, 100.0);
    place(&mut scene, solid_png([0, 0, 255]), 150.0, 120.0);

    let artifact = exporter(ExportResolution::Svga, ExportFormat::Png)
        .export(&scene)
        .await
        .expect("export");
    // Overlap belongs to the later, higher element
    assert_eq!(pixel(&artifact.bytes, 200, 150), [0, 0, 255, 255]);
    assert_eq!(pixel(&artifact.bytes, 120, 110), [255, 0, 0, 255]);
}

#[tokio::test]
async fn test_text_renders_with_system_fonts() {
    let fonts = FontBook::system();
    if fonts.is_empty() {
        eprintln!("no system fonts installed, skipping");
        return;
    }
    let mut scene = Scene::new(800.0, 600.0);
    let style = TextStyle {
        font_size_px: 48.0,
        color: "#ff0000".into(),
        align: TextAlign::Left,
        ..TextStyle::default()
    };
    scene
        .add_text(
            "Mug",
            style,
            Point::new(100.0, 100.0),
            Size::new(300.0, 100.0),
        )
        .expect("text");

    let config = ExportConfig {
        resolution: ExportResolution::Svga,
        ..ExportConfig::default()
    };
    let pixmap = SceneExporter::new(config, Arc::new(fonts))
        .render(&scene)
        .await
        .expect("render");

    let reddish = pixmap
        .pixels()
        .iter()
        .filter(|px| px.red() > 200 && px.green() < 60)
        .count();
    assert!(reddish > 50, "expected red glyph pixels, got {reddish}");
}

// ==========================================================================
// Formats and artifacts
// ==========================================================================

#[tokio::test]
async fn test_every_format_has_expected_signature() {
    let mut scene = Scene::new(800.0, 600.0);
    place(&mut scene, solid_png([40, 80, 120]), 50.0, 50.0);

    let png = exporter(ExportResolution::Svga, ExportFormat::Png)
        .export(&scene)
        .await
        .expect("png");
    assert_eq!(&png.bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert!(png.file_name.ends_with(".png"));
    assert_eq!(png.mime_type, "image/png");

    let jpeg = exporter(ExportResolution::Svga, ExportFormat::Jpeg)
        .export(&scene)
        .await
        .expect("jpeg");
    assert_eq!(&jpeg.bytes[..3], &[0xFF, 0xD8, 0xFF]);
    assert!(jpeg.file_name.ends_with(".jpeg"));

    let webp = exporter(ExportResolution::Svga, ExportFormat::WebP)
        .export(&scene)
        .await
        .expect("webp");
    assert_eq!(&webp.bytes[..4], b"RIFF");
    assert_eq!(&webp.bytes[8..12], b"WEBP");
    assert_eq!(webp.mime_type, "image/webp");
}

#[tokio::test]
async fn test_export_with_hands_artifact_to_callback() {
    let scene = Scene::new(800.0, 600.0);
    let name = exporter(ExportResolution::Svga, ExportFormat::Png)
        .export_with(&scene, |artifact: ExportArtifact| artifact.file_name)
        .await
        .expect("export");
    assert!(name.starts_with("export-"));
}

#[tokio::test]
async fn test_save_artifact_to_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = Scene::new(800.0, 600.0);
    let artifact = exporter(ExportResolution::Svga, ExportFormat::Png)
        .export(&scene)
        .await
        .expect("export");

    let path = artifact.save_to(dir.path()).expect("save");
    assert_eq!(path.parent(), Some(dir.path()));
    assert_eq!(std::fs::read(&path).expect("read back"), artifact.bytes);
}
