use super::*;

#[test]
fn legacy_keys_are_accepted() {
    let json = r#"{
        "theme": "kombucha",
        "type": "reel",
        "video_sources": ["a.mp4", "b.mp4"],
        "output_video": "out/reels/kombucha.mp4",
        "generated_at": "2024-05-01T10:00:00",
        "caption_data": {"caption": "hi"},
        "text_overlays": [{"text": "x", "start_time": 0}]
    }"#;
    let r = OutputRecord::from_json_str(json).unwrap();
    assert_eq!(r.kind, OutputKind::Reel);
    assert_eq!(r.output.as_deref(), Some("out/reels/kombucha.mp4"));
    assert!(r.extra.contains_key("caption_data"));
    assert!(r.extra.contains_key("text_overlays"));
    assert_eq!(
        r.used_assets(),
        vec![
            (AssetCategory::Video, "a.mp4".to_owned()),
            (AssetCategory::Video, "b.mp4".to_owned()),
        ]
    );
}

#[test]
fn unknown_output_type_does_not_fail() {
    let r = OutputRecord::from_json_str(r#"{"type": "story", "image_source": "x.png"}"#).unwrap();
    assert_eq!(r.kind, OutputKind::Unknown);
    assert_eq!(r.used_assets(), vec![(AssetCategory::Image, "x.png".to_owned())]);
}

#[test]
fn history_scans_root_and_subdirs_skipping_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut feed = OutputRecord::new("tea", OutputKind::Feed);
    feed.image_source = Some("tea.jpg".into());
    feed.write(&dir.path().join("feed_posts"), "tea_20240101_120000")
        .unwrap();
    let mut card = OutputRecord::new("tea", OutputKind::QuoteCard);
    card.quote = Some("Drink up".into());
    card.write(dir.path(), "quote_1").unwrap();

    std::fs::write(dir.path().join("broken_metadata.json"), "{not json").unwrap();
    std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

    let records = load_history(dir.path());
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.image_source.as_deref() == Some("tea.jpg")));
    assert!(records.iter().any(|r| r.quote.as_deref() == Some("Drink up")));
}

#[test]
fn missing_root_is_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_history(&dir.path().join("nope")).is_empty());
}

#[test]
fn written_record_round_trips_assets() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = OutputRecord::new("sleep", OutputKind::Reel);
    r.video_sources = vec!["v.mp4".into()];
    r.music_source = Some("m.mp3".into());
    let path = r.write(dir.path(), "sleep_x").unwrap();
    assert!(path.ends_with("sleep_x_metadata.json"));
    let back = OutputRecord::from_json_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(back.used_assets(), r.used_assets());
    assert!(back.generated_at.is_some());
}
