use super::*;

#[test]
fn formats_sections_with_blank_lines() {
    let c = CaptionData {
        caption: "Fresh batch today.".into(),
        hashtags: vec!["#kombucha".into(), "#madeira".into()],
        cta: "Try it now!".into(),
    };
    assert_eq!(c.format(), "Fresh batch today.\n\nTry it now!\n\n#kombucha #madeira");
}

#[test]
fn empty_parts_are_skipped() {
    let c = CaptionData {
        caption: "Only words".into(),
        ..CaptionData::default()
    };
    assert_eq!(c.format(), "Only words\n");
    assert_eq!(CaptionData::default().format(), "");
}

#[test]
fn truncation_counts_characters_not_bytes() {
    assert_eq!(truncate_chars("chá de kombucha", 3), "chá");
    assert_eq!(truncate_chars("abc", 10), "abc");
    assert_eq!(truncate_chars("abc", 0), "");
}
