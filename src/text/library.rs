use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use anyhow::Context as _;

use crate::{
    foundation::core::Rgb8,
    foundation::error::{ReelError, ReelResult},
    text::font::{FontSpec, FontWeight},
    text::metrics::{FontMetrics, TextExtent},
};

/// Brush carried through parley layouts. Only the fill color is needed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Rgb8> for GlyphBrush {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// One registered font file.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub family: String,
    pub bold: bool,
    pub bytes: Arc<Vec<u8>>,
}

/// Glyph positioned relative to the top-left corner of its line box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// A single shaped line ready to rasterize.
#[derive(Clone, Debug)]
pub struct ShapedLine {
    pub face: FontFace,
    pub size_px: f32,
    pub glyphs: Vec<PlacedGlyph>,
    pub width_px: f32,
    pub height_px: f32,
}

/// Installed families tried, in order, when nothing usable has been registered yet.
const SYSTEM_FALLBACKS: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
    "Noto Sans",
];

/// System font database, scanned on first use and shared between forks.
#[derive(Clone, Default)]
struct SystemFonts {
    db: Arc<OnceLock<fontdb::Database>>,
}

impl std::fmt::Debug for SystemFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFonts")
            .field("scanned", &self.db.get().map(fontdb::Database::len))
            .finish()
    }
}

impl SystemFonts {
    fn database(&self) -> &fontdb::Database {
        self.db.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "scanned system fonts");
            db
        })
    }

    /// Regular and bold font files of the first installed family in `families`.
    fn files_for(&self, families: &[fontdb::Family<'_>]) -> Vec<Vec<u8>> {
        let db = self.database();
        let mut ids = Vec::new();
        for weight in [fontdb::Weight::NORMAL, fontdb::Weight::BOLD] {
            let query = fontdb::Query {
                families,
                weight,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            };
            if let Some(id) = db.query(&query) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        let mut files: Vec<Vec<u8>> = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(bytes) = db.with_face_data(id, |data, _index| data.to_vec()) else {
                continue;
            };
            // Both weights can live in one collection file.
            if !files.contains(&bytes) {
                files.push(bytes);
            }
        }
        files
    }
}

/// Font files shared between worker libraries.
#[derive(Clone, Debug, Default)]
pub struct FontSources {
    files: Vec<Arc<Vec<u8>>>,
    default_family: Option<String>,
    system: Option<SystemFonts>,
}

impl FontSources {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn open(&self) -> FontLibrary {
        let mut lib = FontLibrary::isolated();
        lib.system = self.system.clone();
        for bytes in &self.files {
            if let Err(e) = lib.register_bytes(bytes.as_ref().clone()) {
                tracing::warn!(error = %e, "failed to reopen font");
            }
        }
        if self.default_family.is_some() {
            lib.default_family = self.default_family.clone();
        }
        lib
    }
}

/// Parley-backed metrics provider.
///
/// Fonts handed to [`FontLibrary::register_bytes`] or found by [`FontLibrary::load_dir`]
/// resolve first. A family that was never registered is looked up once among the
/// installed system fonts; when the library is still empty at that point a common
/// sans-serif face is registered as well, so some family always resolves. Anything
/// still unknown falls back to the default family (the first registered, unless
/// overridden).
pub struct FontLibrary {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    faces: Vec<FontFace>,
    default_family: Option<String>,
    system: Option<SystemFonts>,
    /// Lowercased families already looked up in `system`.
    probed: HashSet<String>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("families", &self.families())
            .field("default_family", &self.default_family)
            .finish()
    }
}

impl FontLibrary {
    /// Library backed by the installed system fonts.
    pub fn new() -> Self {
        Self {
            system: Some(SystemFonts::default()),
            ..Self::isolated()
        }
    }

    /// Library that only knows explicitly registered fonts.
    pub fn isolated() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: Vec::new(),
            default_family: None,
            system: None,
            probed: HashSet::new(),
        }
    }

    /// Build a library from configured font directories.
    ///
    /// `fallback` becomes the default family when it names a registered family.
    pub fn from_dirs(dirs: &[PathBuf], fallback: Option<&str>) -> Self {
        let mut lib = Self::new();
        for dir in dirs {
            let n = lib.load_dir(dir);
            tracing::debug!(dir = %dir.display(), faces = n, "scanned font directory");
        }
        if let Some(name) = fallback {
            lib.ensure_family(name);
            if lib.set_default_family(name).is_err() {
                tracing::warn!(family = name, "configured fallback family is not registered");
            }
        }
        lib
    }

    /// Register one font file's bytes. Returns the family names it contributed.
    pub fn register_bytes(&mut self, bytes: Vec<u8>) -> ReelResult<Vec<String>> {
        let bytes = Arc::new(bytes);
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
        if families.is_empty() {
            return Err(ReelError::validation(
                "no font families registered from font bytes",
            ));
        }

        let mut names = Vec::with_capacity(families.len());
        for (family_id, fonts) in families {
            let name = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| ReelError::validation("registered font family has no name"))?
                .to_string();
            let bold = fonts.iter().any(|f| f.weight().value() >= 600.0);
            self.faces.push(FontFace {
                family: name.clone(),
                bold,
                bytes: Arc::clone(&bytes),
            });
            names.push(name);
        }

        if self.default_family.is_none() {
            self.default_family = names.first().cloned();
        }
        Ok(names)
    }

    pub fn register_file(&mut self, path: &Path) -> ReelResult<Vec<String>> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        self.register_bytes(bytes)
    }

    /// Register every `.ttf`/`.otf`/`.ttc` file directly inside `dir`.
    ///
    /// Unreadable directories and files are skipped. Returns how many files registered.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return 0;
        };

        let mut paths: Vec<PathBuf> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_font_file(p))
            .collect();
        // Directory order is platform dependent; the default family must not be.
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.register_file(&path) {
                Ok(_) => loaded += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping font"),
            }
        }
        loaded
    }

    pub fn set_default_family(&mut self, family: &str) -> ReelResult<()> {
        let name = self
            .lookup_family(family)
            .ok_or_else(|| ReelError::validation(format!("font family '{family}' not registered")))?
            .to_string();
        self.default_family = Some(name);
        Ok(())
    }

    pub fn default_family(&self) -> Option<&str> {
        self.default_family.as_deref()
    }

    pub fn families(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for f in &self.faces {
            if !out.contains(&f.family.as_str()) {
                out.push(&f.family);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// A library with fresh shaping contexts over the same font files.
    pub fn fork(&self) -> Self {
        self.sources().open()
    }

    /// Thread-safe snapshot of the registered font files.
    ///
    /// Shaping contexts are mutable, so parallel workers each open their own library.
    pub fn sources(&self) -> FontSources {
        let mut files: Vec<Arc<Vec<u8>>> = Vec::new();
        for face in &self.faces {
            // A collection file contributes one face per family but is registered once.
            if !files.iter().any(|b| Arc::ptr_eq(b, &face.bytes)) {
                files.push(Arc::clone(&face.bytes));
            }
        }
        FontSources {
            files,
            default_family: self.default_family.clone(),
            system: self.system.clone(),
        }
    }

    /// Register `family` from the system fonts when it is not registered yet.
    ///
    /// With no default family, the first installed common sans-serif family is
    /// registered too. Each family is looked up at most once.
    pub fn ensure_family(&mut self, family: &str) {
        let Some(system) = self.system.clone() else {
            return;
        };
        let family = family.trim();
        if self.lookup_family(family).is_some() || !self.probed.insert(family.to_ascii_lowercase())
        {
            return;
        }

        let mut wanted = Vec::with_capacity(SYSTEM_FALLBACKS.len() + 2);
        if !family.is_empty() {
            wanted.push(fontdb::Family::Name(family));
        }
        if self.default_family.is_none() {
            wanted.extend(SYSTEM_FALLBACKS.iter().map(|&f| fontdb::Family::Name(f)));
            wanted.push(fontdb::Family::SansSerif);
        }
        if wanted.is_empty() {
            return;
        }

        let mut registered = 0;
        for bytes in system.files_for(&wanted) {
            match self.register_bytes(bytes) {
                Ok(names) => {
                    registered += 1;
                    tracing::debug!(requested = family, ?names, "registered system font");
                }
                Err(e) => tracing::warn!(requested = family, error = %e, "skipping system font"),
            }
        }
        if registered == 0 && self.default_family.is_none() {
            tracing::warn!(requested = family, "no usable system font found");
        }
    }

    fn lookup_family(&self, family: &str) -> Option<&str> {
        self.faces
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family.trim()))
            .map(|f| f.family.as_str())
    }

    /// Concrete family used for `font`: the requested family, else the default.
    pub fn resolve_family(&self, font: &FontSpec) -> ReelResult<String> {
        self.lookup_family(&font.family)
            .or(self.default_family.as_deref())
            .map(str::to_string)
            .ok_or_else(|| ReelError::measurement("no fonts registered"))
    }

    /// Face whose bytes back `family`, preferring one matching the requested weight.
    pub fn face_for(&self, family: &str, weight: FontWeight) -> Option<&FontFace> {
        let mut fallback = None;
        for face in self.faces.iter().filter(|f| f.family == family) {
            if face.bold == weight.is_bold() {
                return Some(face);
            }
            fallback.get_or_insert(face);
        }
        fallback
    }

    fn build_layout(&mut self, font: &FontSpec, text: &str) -> ReelResult<parley::Layout<GlyphBrush>> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(ReelError::measurement("font size_px must be finite and > 0"));
        }
        self.ensure_family(&font.family);
        let family = self.resolve_family(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        if font.weight.is_bold() {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush::from(
            font.color,
        )));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Shape `text` as a single line and return its glyphs for rasterization.
    pub fn shape_line(&mut self, font: &FontSpec, text: &str) -> ReelResult<ShapedLine> {
        self.ensure_family(&font.family);
        let family = self.resolve_family(font)?;
        let face = self
            .face_for(&family, font.weight)
            .cloned()
            .ok_or_else(|| ReelError::measurement(format!("no face for family '{family}'")))?;

        let layout = self.build_layout(font, text)?;
        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        Ok(ShapedLine {
            face,
            size_px: font.size_px,
            glyphs,
            width_px: layout.width(),
            height_px: layout.height(),
        })
    }
}

impl FontMetrics for FontLibrary {
    fn measure(&mut self, font: &FontSpec, text: &str) -> ReelResult<TextExtent> {
        let layout = self.build_layout(font, text)?;
        Ok(TextExtent {
            width_px: layout.width(),
            height_px: layout.height(),
        })
    }

    fn fallback_family(&mut self, font: &FontSpec) -> Option<String> {
        self.ensure_family(&font.family);
        if self.lookup_family(&font.family).is_some() {
            return None;
        }
        self.default_family.clone()
    }
}

fn is_font_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc")
}

#[cfg(test)]
#[path = "../../tests/unit/text/library.rs"]
mod tests;
