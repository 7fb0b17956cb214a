use super::*;

#[test]
fn parse_hex_accepts_optional_hash_and_any_case() {
    let (c, a) = parse_hex("#1A5F3F").unwrap();
    assert_eq!(c, Rgb8::new(0x1a, 0x5f, 0x3f));
    assert_eq!(a, 255);
    assert_eq!(parse_hex("1a5f3f").unwrap().0, c);
}

#[test]
fn parse_hex_reads_alpha_pair() {
    let (c, a) = parse_hex("#ffffff80").unwrap();
    assert_eq!(c, Rgb8::WHITE);
    assert_eq!(a, 0x80);
}

#[test]
fn parse_hex_rejects_bad_input() {
    assert!(parse_hex("#fff").is_err());
    assert!(parse_hex("#gg0000").is_err());
    assert!(parse_hex("#ffé000").is_err());
    assert!(parse_hex("").is_err());
}

#[test]
fn to_hex_is_lowercase_with_hash() {
    assert_eq!(to_hex(Rgb8::new(0x8b, 0xc3, 0x4a)), "#8bc34a");
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Holder {
    #[serde(with = "hex_rgb")]
    c: Rgb8,
}

#[test]
fn hex_rgb_accepts_all_shapes() {
    let a: Holder = serde_json::from_str(r##"{"c":"#336699"}"##).unwrap();
    let b: Holder = serde_json::from_str(r#"{"c":[51,102,153]}"#).unwrap();
    let c: Holder = serde_json::from_str(r#"{"c":{"r":51,"g":102,"b":153}}"#).unwrap();
    assert_eq!(a.c, Rgb8::new(0x33, 0x66, 0x99));
    assert_eq!(a.c, b.c);
    assert_eq!(b.c, c.c);

    let out = serde_json::to_string(&a).unwrap();
    assert_eq!(out, r##"{"c":"#336699"}"##);
}

#[test]
fn hex_rgb_reports_invalid_hex() {
    let err = serde_json::from_str::<Holder>(r#"{"c":"blue"}"#);
    assert!(err.is_err());
}
