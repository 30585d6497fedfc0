use super::*;
use crate::config::BoothConfig;
use image::{Rgb, RgbImage};
use tempfile::TempDir;

#[test]
fn test_letterbox_wide_image_pads_vertically() {
    let placement = letterbox((1600, 900), (800, 600));
    assert_eq!(placement.padding, Padding::Vertical);
    assert_eq!((placement.width, placement.height), (800, 450));
    assert_eq!(placement.offset(), (0, 75));
}

#[test]
fn test_letterbox_tall_image_pads_horizontally() {
    let placement = letterbox((600, 1600), (800, 600));
    assert_eq!(placement.padding, Padding::Horizontal);
    assert_eq!((placement.width, placement.height), (225, 600));
    assert_eq!(placement.offset(), (287, 0));
}

#[test]
fn test_letterbox_matching_aspect_has_no_padding() {
    let placement = letterbox((1600, 1200), (800, 600));
    assert_eq!(placement, Placement::full_screen((800, 600)));
    assert_eq!(placement.padding, Padding::None);
}

#[test]
fn test_letterbox_degenerate_image() {
    let placement = letterbox((0, 900), (800, 600));
    assert_eq!(placement, Placement::full_screen((800, 600)));
}

#[test]
fn test_probe_dimensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pose.png");
    RgbImage::new(40, 30).save(&path).unwrap();

    assert_eq!(probe_dimensions(&path).unwrap(), (40, 30));
    assert!(probe_dimensions(&dir.path().join("missing.png")).is_err());
}

#[test]
fn test_rgb_to_rgb565_conversion() {
    let mut image = RgbImage::new(3, 1);
    image.put_pixel(0, 0, Rgb([255, 0, 0]));
    image.put_pixel(1, 0, Rgb([0, 255, 0]));
    image.put_pixel(2, 0, Rgb([0, 0, 255]));

    let data = DisplayConverter::rgb_to_rgb565(&image);
    assert_eq!(data, vec![0x00, 0xF8, 0xE0, 0x07, 0x1F, 0x00]);
    assert_eq!(DisplayConverter::blank_rgb565(4, 2).len(), 16);
}

#[test]
fn test_render_frame_letterboxes_onto_black_canvas() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wide.png");
    RgbImage::from_pixel(160, 90, Rgb([255, 255, 255]))
        .save(&path)
        .unwrap();

    let screen = (80, 60);
    let placement = letterbox((160, 90), screen);
    let frame = render_frame(&path, 0.0, placement, screen).unwrap();

    assert_eq!(frame.dimensions(), screen);
    // Bars above and below, image in the middle
    assert_eq!(frame.get_pixel(40, 2), &Rgb([0, 0, 0]));
    assert_eq!(frame.get_pixel(40, 57), &Rgb([0, 0, 0]));
    assert_eq!(frame.get_pixel(40, 30), &Rgb([255, 255, 255]));
}

#[test]
fn test_render_frame_rotation_keeps_canvas_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("square.png");
    RgbImage::from_pixel(60, 60, Rgb([200, 200, 200]))
        .save(&path)
        .unwrap();

    let screen = (60, 60);
    let frame = render_frame(&path, 5.0, letterbox((60, 60), screen), screen).unwrap();
    assert_eq!(frame.dimensions(), screen);
    // Rotation exposes black corners
    assert_eq!(frame.get_pixel(0, 0), &Rgb([0, 0, 0]));
}

#[tokio::test]
async fn test_framebuffer_writes_rgb565_frames() {
    let dir = TempDir::new().unwrap();
    let fb_path = dir.path().join("fb0");
    std::fs::write(&fb_path, b"").unwrap();

    let mut config = BoothConfig::default().display;
    config.framebuffer_device = fb_path.to_string_lossy().into_owned();
    config.resolution = (8, 6);

    let image_path = dir.path().join("img.png");
    RgbImage::from_pixel(8, 6, Rgb([255, 255, 255]))
        .save(&image_path)
        .unwrap();

    let display = FramebufferDisplay::new(&config).unwrap();
    display
        .show(&image_path, 0.0, letterbox((8, 6), (8, 6)))
        .await
        .unwrap();
    let data = std::fs::read(&fb_path).unwrap();
    assert_eq!(data.len(), 8 * 6 * 2);
    assert!(data.iter().all(|b| *b == 0xFF));

    display.clear().await.unwrap();
    let data = std::fs::read(&fb_path).unwrap();
    assert!(data.iter().all(|b| *b == 0));
}

#[test]
fn test_framebuffer_missing_device() {
    let mut config = BoothConfig::default().display;
    config.framebuffer_device = "/nonexistent/fb0".to_string();
    assert!(matches!(
        FramebufferDisplay::new(&config),
        Err(crate::error::DisplayError::Framebuffer { .. })
    ));
}

#[tokio::test]
async fn test_mock_display_records_calls() {
    let display = MockDisplay::new();
    let placement = letterbox((1600, 900), (800, 600));
    display
        .show(std::path::Path::new("a.png"), 2.5, placement)
        .await
        .unwrap();
    display.clear().await.unwrap();

    assert_eq!(
        display.calls(),
        vec![
            DisplayCall::Show {
                path: "a.png".into(),
                rotation_degrees: 2.5,
                placement,
            },
            DisplayCall::Clear,
        ]
    );
    assert!(MockDisplay::broken()
        .show(std::path::Path::new("a.png"), 0.0, placement)
        .await
        .is_err());
}
