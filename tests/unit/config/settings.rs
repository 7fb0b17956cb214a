use super::*;

#[test]
fn defaults_match_platform_formats() {
    let s = Settings::default();
    s.validate().unwrap();

    let post = s.post_canvas().unwrap();
    assert_eq!((post.width, post.height), (1080, 1080));
    let reel = s.reel_canvas().unwrap();
    assert_eq!((reel.width, reel.height), (1080, 1920));

    let t = s.timeline_config();
    assert_eq!(t.min_duration_sec, 15.0);
    assert_eq!(t.max_duration_sec, 90.0);
    assert_eq!(t.segment_cap_sec, 10.0);
    assert!((t.attenuation - 0.3).abs() < 1e-6);
    assert_eq!(s.instagram.fps, 30);
}

#[test]
fn empty_yaml_yields_defaults() {
    assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
    assert_eq!(Settings::from_yaml_str("{}").unwrap(), Settings::default());
}

#[test]
fn yaml_overrides_brand_and_dimensions() {
    let yaml = r##"
brand:
  name: "Test Brew"
  colors:
    primary: "#112233"
    background: [0, 0, 0]
instagram:
  reel_dimensions: { width: 720, height: 1280 }
  reel_duration: { min: 10, max: 30 }
overlay:
  intro_fraction: 0.2
"##;
    let s = Settings::from_yaml_str(yaml).unwrap();
    assert_eq!(s.brand.name, "Test Brew");
    assert_eq!(s.brand.colors.primary, Rgb8::new(0x11, 0x22, 0x33));
    assert_eq!(s.brand.colors.background, Rgb8::BLACK);
    // Untouched fields keep their defaults.
    assert_eq!(s.brand.colors.secondary, Rgb8::new(0x8b, 0xc3, 0x4a));
    assert_eq!(s.instagram.feed_dimensions.width, 1080);

    let reel = s.reel_canvas().unwrap();
    assert_eq!((reel.width, reel.height), (720, 1280));
    assert_eq!(reel.background, Rgb8::BLACK);
    assert_eq!(s.timeline_config().max_duration_sec, 30.0);
    assert_eq!(s.overlay.intro_fraction, 0.2);
}

#[test]
fn json_and_yaml_files_load_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let json = dir.path().join("settings.json");
    std::fs::write(&json, r#"{"instagram":{"fps":24}}"#).unwrap();
    assert_eq!(Settings::from_path(&json).unwrap().instagram.fps, 24);

    let yaml = dir.path().join("settings.yaml");
    std::fs::write(&yaml, "instagram:\n  fps: 25\n").unwrap();
    assert_eq!(Settings::from_path(&yaml).unwrap().instagram.fps, 25);

    assert!(Settings::from_path(&dir.path().join("missing.yaml")).is_err());
    assert_eq!(Settings::load(None).unwrap(), Settings::default());
}

#[test]
fn inverted_duration_bounds_are_rejected() {
    let yaml = "instagram:\n  reel_duration: { min: 40, max: 20 }\n";
    let err = Settings::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ReelError::InvalidBounds(_)), "{err}");
}

#[test]
fn out_of_range_values_are_rejected() {
    assert!(Settings::from_yaml_str("instagram:\n  fps: 0\n").is_err());
    assert!(Settings::from_yaml_str("overlay:\n  closing_fraction: 1.5\n").is_err());
    assert!(Settings::from_yaml_str("layout:\n  quote_font_size_px: 0\n").is_err());
    assert!(
        Settings::from_yaml_str("instagram:\n  feed_dimensions: { width: 0, height: 10 }\n")
            .is_err()
    );
    assert!(Settings::from_yaml_str("brand: [1, 2]\n").is_err());
}

#[test]
fn font_helpers_follow_brand() {
    let s = Settings::default();
    let quote = s.quote_font();
    assert_eq!(quote.color, s.brand.colors.primary);
    assert_eq!(quote.weight, FontWeight::Bold);
    assert_eq!(quote.size_px, 60.0);

    let author = s.author_font();
    assert_eq!(author.color, s.brand.colors.text);
    assert_eq!(author.weight, FontWeight::Normal);

    let overlay = s.overlay_font();
    assert_eq!(overlay.stroke.map(|st| st.color), Some(s.brand.colors.background));
}

#[test]
fn block_helpers_size_to_canvas() {
    let s = Settings::default();
    let feed = s.post_canvas().unwrap();

    let block = s.text_block("hi", s.post_font(), feed, Anchor::Top);
    assert_eq!(block.max_width_px, 1000.0);
    assert_eq!(block.anchor, Anchor::Top);

    let quote = s.quote_block("q", feed);
    assert_eq!(quote.max_width_px, 920.0);
    assert_eq!(quote.line_gap_px, 20.0);

    let author = s.author_block("Hippocrates", feed);
    assert_eq!(author.text, "\u{2014} Hippocrates");
}
