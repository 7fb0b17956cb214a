use super::*;

fn system_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

#[test]
fn isolated_library_cannot_measure() {
    let mut lib = FontLibrary::isolated();
    assert!(lib.is_empty());
    assert!(lib.default_family().is_none());
    let font = FontSpec::new("Arial", 20.0);
    assert!(matches!(
        lib.measure(&font, "hello"),
        Err(ReelError::Measurement(_))
    ));
    assert_eq!(lib.fallback_family(&font), None);
}

#[test]
fn load_dir_skips_missing_dirs_and_non_fonts() {
    let mut lib = FontLibrary::isolated();
    assert_eq!(lib.load_dir(Path::new("/definitely/not/here")), 0);

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not a font").unwrap();
    std::fs::write(dir.path().join("broken.ttf"), b"not a font either").unwrap();
    assert_eq!(lib.load_dir(dir.path()), 0);
    assert!(lib.is_empty());
}

#[test]
fn unknown_default_family_is_rejected() {
    let mut lib = FontLibrary::isolated();
    assert!(lib.set_default_family("Nope").is_err());
}

#[test]
fn registered_font_measures_and_substitutes() {
    let Some(bytes) = system_font() else {
        eprintln!("no system font available, skipping");
        return;
    };
    let mut lib = FontLibrary::isolated();
    let names = lib.register_bytes(bytes).unwrap();
    assert!(!names.is_empty());
    let family = names[0].clone();
    assert_eq!(lib.default_family(), Some(family.as_str()));

    let font = FontSpec::new(&family, 20.0);
    let short = lib.measure(&font, "tea").unwrap();
    let long = lib.measure(&font, "fermented tea").unwrap();
    assert!(short.width_px > 0.0);
    assert!(long.width_px > short.width_px);
    assert!(short.height_px > 0.0);
    assert_eq!(lib.fallback_family(&font), None);

    let missing = FontSpec::new("No Such Family", 20.0);
    assert_eq!(lib.fallback_family(&missing), Some(family.clone()));
    let substituted = lib.measure(&missing, "tea").unwrap();
    assert!((substituted.width_px - short.width_px).abs() < 1e-3);

    let shaped = lib.shape_line(&font, "tea").unwrap();
    assert_eq!(shaped.glyphs.len(), 3);
    assert_eq!(shaped.face.family, family);

    let mut forked = lib.fork();
    assert_eq!(forked.families(), lib.families());
    let again = forked.measure(&font, "tea").unwrap();
    assert!((again.width_px - short.width_px).abs() < 1e-3);
}

#[test]
fn sources_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FontSources>();

    let lib = FontLibrary::isolated();
    let sources = lib.sources();
    assert!(sources.is_empty());
    let opened = std::thread::spawn(move || sources.open().is_empty())
        .join()
        .unwrap();
    assert!(opened);
}

#[test]
fn unregistered_family_resolves_from_installed_fonts() {
    if system_font().is_none() {
        eprintln!("no system font available, skipping");
        return;
    }
    let mut lib = FontLibrary::new();
    assert!(lib.is_empty());

    let font = FontSpec::new("No Such Family", 20.0);
    let extent = lib.measure(&font, "gut health").unwrap();
    assert!(extent.width_px > 0.0);
    assert!(!lib.is_empty());
    let substituted = lib.fallback_family(&font).unwrap();
    assert_eq!(lib.default_family(), Some(substituted.as_str()));

    let shaped = lib.shape_line(&font, "tea").unwrap();
    assert_eq!(shaped.glyphs.len(), 3);

    // Forks reuse the registered system faces.
    let mut forked = lib.sources().open();
    assert_eq!(forked.families(), lib.families());
    assert!(forked.measure(&font, "tea").is_ok());
}

#[test]
fn missing_family_is_looked_up_once() {
    let mut lib = FontLibrary::new();
    lib.ensure_family("No Such Family");
    let after_first = lib.families().len();
    lib.ensure_family("no such family");
    assert_eq!(lib.families().len(), after_first);
}
