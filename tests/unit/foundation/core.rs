use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10, Rgb8::WHITE).is_err());
    assert!(Canvas::new(10, 0, Rgb8::WHITE).is_err());
    let c = Canvas::new(1080, 1920, Rgb8::WHITE).unwrap();
    assert_eq!(c.bounds(), Rect::new(0.0, 0.0, 1080.0, 1920.0));
}

#[test]
fn anchor_parses_case_insensitively() {
    assert_eq!("TOP".parse::<Anchor>().unwrap(), Anchor::Top);
    assert_eq!("centre".parse::<Anchor>().unwrap(), Anchor::Center);
    assert_eq!(" bottom ".parse::<Anchor>().unwrap(), Anchor::Bottom);
    assert!("left".parse::<Anchor>().is_err());
}

#[test]
fn premul_halves_channels_at_half_alpha() {
    let c = Rgb8::new(200, 100, 0).with_alpha(128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, ((200u16 * 128 + 127) / 255) as u8);
    assert_eq!(c.b, 0);
    assert_eq!(Rgb8::WHITE.opaque().to_array(), [255, 255, 255, 255]);
}
