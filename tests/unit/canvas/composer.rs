use super::*;
use crate::foundation::core::{Anchor, Rgb8};
use crate::foundation::error::ReelError;
use crate::text::font::Stroke;

fn system_fonts() -> FontLibrary {
    let mut lib = FontLibrary::isolated();
    for p in [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ] {
        if let Ok(bytes) = std::fs::read(p) {
            let _ = lib.register_bytes(bytes);
            break;
        }
    }
    lib
}

fn feed() -> Canvas {
    Canvas::new(320, 320, Rgb8::WHITE).unwrap()
}

fn block(text: &str) -> TextBlock {
    let font = FontSpec::new("DejaVu Sans", 24.0).with_color(Rgb8::BLACK);
    TextBlock::new(text, font, 280.0)
        .with_anchor(Anchor::Bottom)
        .with_padding(20.0)
}

#[test]
fn image_post_keeps_canvas_dimensions_without_text() {
    let mut fonts = FontLibrary::new();
    let mut composer =
        CanvasComposer::new(&mut fonts, FitConfig::default(), PlacementConfig::default());
    let base = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        1000,
        500,
        image::Rgba([0, 0, 255, 255]),
    ));
    let out = composer
        .compose_image_post(Some(&base), &block(""), feed())
        .unwrap();
    assert_eq!((out.frame.width, out.frame.height), (320, 320));
    let center = out.frame.pixel(160, 160).unwrap();
    assert!(center[2] > 250 && center[0] < 5, "{center:?}");
    // Letterbox bars keep the background.
    assert_eq!(out.frame.pixel(160, 5), Some([255, 255, 255, 255]));
    assert!(out.placement.panel.is_none());
}

#[test]
fn text_without_any_font_is_rejected() {
    let mut fonts = FontLibrary::isolated();
    let mut composer =
        CanvasComposer::new(&mut fonts, FitConfig::default(), PlacementConfig::default());
    let err = composer
        .compose_image_post(None, &block("Hello"), feed())
        .unwrap_err();
    assert!(matches!(err, ReelError::Measurement(_)), "{err}");
}

#[test]
fn default_library_draws_with_installed_fonts() {
    if system_fonts().is_empty() {
        eprintln!("no system font available, skipping");
        return;
    }
    let mut fonts = FontLibrary::new();
    let mut composer =
        CanvasComposer::new(&mut fonts, FitConfig::default(), PlacementConfig::default());
    let out = composer
        .compose_image_post(None, &block("Kombucha supports gut health."), feed())
        .unwrap();
    assert!(!out.placement.lines.is_empty());
    assert!(!fonts.is_empty());
    let inked = (0..320u32)
        .flat_map(|y| (0..320u32).map(move |x| (x, y)))
        .filter_map(|(x, y)| out.frame.pixel(x, y))
        .any(|p| p[0] < 128 && p[1] < 128 && p[2] < 128);
    assert!(inked, "expected dark glyph pixels on the white canvas");
}

#[test]
fn image_post_draws_panel_and_text() {
    let mut fonts = system_fonts();
    if fonts.is_empty() {
        eprintln!("no system font available, skipping");
        return;
    }
    let cfg = PlacementConfig {
        panel_color: Rgb8::WHITE,
        ..PlacementConfig::default()
    };
    let mut composer = CanvasComposer::new(&mut fonts, FitConfig::default(), cfg);
    let base = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        320,
        320,
        image::Rgba([0, 0, 0, 255]),
    ));
    let out = composer
        .compose_image_post(Some(&base), &block("Kombucha supports gut health."), feed())
        .unwrap();

    let panel = out.placement.panel.unwrap();
    let inside = out.frame.pixel(panel.x0 as u32 + 1, panel.y0 as u32 + 1).unwrap();
    assert_eq!(inside, [200, 200, 200, 255]);

    let text = out.placement.text_bounds().unwrap();
    assert!(text.y1 <= 320.0);
    let mut dark = 0;
    for y in text.y0 as u32..text.y1 as u32 {
        for x in text.x0 as u32..text.x1 as u32 {
            if out.frame.pixel(x, y).unwrap()[0] < 100 {
                dark += 1;
            }
        }
    }
    assert!(dark > 0, "no glyph pixels drawn");
}

#[test]
fn quote_card_stacks_attribution_below_quote() {
    let mut fonts = system_fonts();
    if fonts.is_empty() {
        eprintln!("no system font available, skipping");
        return;
    }
    let mut composer =
        CanvasComposer::new(&mut fonts, FitConfig::default(), PlacementConfig::default());
    let quote = block("Let food be thy medicine.").with_anchor(Anchor::Center);
    let author = block("\u{2014} Hippocrates").with_anchor(Anchor::Center);
    let out = composer
        .compose_quote_card(&quote, Some(&author), feed())
        .unwrap();
    let last = out.placement.lines.last().unwrap();
    assert!(last.text.contains("Hippocrates"));
    assert!(out.placement.lines[0].rect.y1 < last.rect.y0);
    assert!(out.placement.panel.is_none());
}

#[test]
fn overlay_frame_is_transparent_outside_text() {
    let mut fonts = system_fonts();
    if fonts.is_empty() {
        eprintln!("no system font available, skipping");
        return;
    }
    let mut composer =
        CanvasComposer::new(&mut fonts, FitConfig::default(), PlacementConfig::default());
    let mut b = block("Drink up");
    b.font = b.font.with_stroke(Stroke {
        color: Rgb8::WHITE,
        width_px: 2.0,
    });
    let layout = composer.layout(&b, feed());
    let frame = composer.render_overlay(&layout, &b, feed()).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert!(frame.data.chunks_exact(4).any(|p| p[3] > 0));
}
