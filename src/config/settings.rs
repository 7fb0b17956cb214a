use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    canvas::placement::PlacementConfig,
    config::color::hex_rgb,
    foundation::core::{Anchor, Canvas, Rgb8},
    foundation::error::{ReelError, ReelResult},
    text::font::{FontSpec, FontWeight, Stroke},
    text::fitter::{FitConfig, TextBlock},
    timeline::model::{ReadingSpeed, TimelineConfig},
};

/// Complete engine configuration.
///
/// The on-disk shape follows the content generator's `settings.yaml` (`brand`, `instagram`)
/// and adds engine sections (`layout`, `overlay`, `audio`, `fonts`). Every field has a default,
/// so an empty document is a valid configuration.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub brand: BrandSettings,
    pub instagram: OutputSettings,
    pub layout: LayoutSettings,
    pub overlay: OverlaySettings,
    pub audio: AudioSettings,
    pub fonts: FontSettings,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrandSettings {
    pub name: String,
    pub website: Option<String>,
    pub colors: BrandColors,
    pub fonts: BrandFonts,
}

impl Default for BrandSettings {
    fn default() -> Self {
        Self {
            name: "Real Health Kombucha".to_string(),
            website: None,
            colors: BrandColors::default(),
            fonts: BrandFonts::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrandColors {
    #[serde(with = "hex_rgb")]
    pub primary: Rgb8,
    #[serde(with = "hex_rgb")]
    pub secondary: Rgb8,
    #[serde(with = "hex_rgb")]
    pub accent: Rgb8,
    #[serde(with = "hex_rgb")]
    pub text: Rgb8,
    #[serde(with = "hex_rgb")]
    pub background: Rgb8,
}

impl Default for BrandColors {
    fn default() -> Self {
        Self {
            primary: Rgb8::new(0x1a, 0x5f, 0x3f),
            secondary: Rgb8::new(0x8b, 0xc3, 0x4a),
            accent: Rgb8::new(0x4c, 0xaf, 0x50),
            text: Rgb8::new(0x33, 0x33, 0x33),
            background: Rgb8::WHITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrandFonts {
    pub heading: String,
    pub body: String,
}

impl Default for BrandFonts {
    fn default() -> Self {
        Self {
            heading: "Arial".to_string(),
            body: "Arial".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DurationBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub feed_dimensions: Dimensions,
    pub reel_dimensions: Dimensions,
    pub reel_duration: DurationBounds,
    pub fps: u32,
    pub video_bitrate: String,
    /// Upper bound for a single media segment on the reel timeline.
    pub segment_cap_sec: f64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            feed_dimensions: Dimensions {
                width: 1080,
                height: 1080,
            },
            reel_dimensions: Dimensions {
                width: 1080,
                height: 1920,
            },
            reel_duration: DurationBounds {
                min: 15.0,
                max: 90.0,
            },
            fps: 30,
            video_bitrate: "8000k".to_string(),
            segment_cap_sec: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub safety_margin_px: f32,
    pub verify_tolerance_px: f32,
    pub max_retries: u32,
    pub padding_px: f64,
    pub panel_padding_px: f64,
    pub panel_alpha: u8,
    pub line_gap_px: f32,
    pub quote_line_gap_px: f32,
    pub attribution_gap_px: f64,
    pub quote_margin_px: f64,
    pub post_font_size_px: f32,
    pub quote_font_size_px: f32,
    pub author_font_size_px: f32,
    pub overlay_font_size_px: f32,
    pub overlay_stroke_px: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            safety_margin_px: 12.0,
            verify_tolerance_px: 2.0,
            max_retries: 3,
            padding_px: 40.0,
            panel_padding_px: 40.0,
            panel_alpha: 200,
            line_gap_px: 10.0,
            quote_line_gap_px: 20.0,
            attribution_gap_px: 40.0,
            quote_margin_px: 80.0,
            post_font_size_px: 48.0,
            quote_font_size_px: 60.0,
            author_font_size_px: 36.0,
            overlay_font_size_px: 60.0,
            overlay_stroke_px: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub words_per_sec: f64,
    pub chars_per_sec: f64,
    pub extra_line_sec: f64,
    pub min_duration_sec: f64,
    pub max_duration_sec: f64,
    pub intro_fraction: f64,
    pub closing_fraction: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            words_per_sec: 2.5,
            chars_per_sec: 100.0,
            extra_line_sec: 0.5,
            min_duration_sec: 2.5,
            max_duration_sec: 12.0,
            intro_fraction: 0.10,
            closing_fraction: 0.50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Background music level relative to its source.
    pub attenuation: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { attenuation: 0.3 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Directories scanned (non-recursively) for `.ttf`/`.otf`/`.ttc` files.
    pub dirs: Vec<PathBuf>,
    /// Family used when a requested family is not registered.
    pub fallback_family: Option<String>,
}

impl Settings {
    /// Load settings from YAML (`.yaml`/`.yml`, the default) or JSON (`.json`).
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings from '{}'", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let settings = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> ReelResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(s: &str) -> ReelResult<Self> {
        // An empty YAML document deserializes as unit, not as an empty map.
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self =
            serde_yaml::from_str(s).map_err(|e| ReelError::serde(format!("settings yaml: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let settings: Self =
            serde_json::from_str(s).map_err(|e| ReelError::serde(format!("settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ReelResult<()> {
        let out = &self.instagram;
        for (name, d) in [("feed", out.feed_dimensions), ("reel", out.reel_dimensions)] {
            if d.width == 0 || d.height == 0 {
                return Err(ReelError::validation(format!(
                    "{name} dimensions must be > 0 (got {}x{})",
                    d.width, d.height
                )));
            }
        }
        self.timeline_config().validate()?;
        if out.fps == 0 {
            return Err(ReelError::validation("fps must be > 0"));
        }
        let layout = &self.layout;
        for (name, v) in [
            ("post_font_size_px", layout.post_font_size_px),
            ("quote_font_size_px", layout.quote_font_size_px),
            ("author_font_size_px", layout.author_font_size_px),
            ("overlay_font_size_px", layout.overlay_font_size_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReelError::validation(format!("{name} must be finite and > 0")));
            }
        }
        if !(0.0..=1.0).contains(&self.overlay.intro_fraction)
            || !(0.0..=1.0).contains(&self.overlay.closing_fraction)
        {
            return Err(ReelError::validation(
                "overlay start fractions must be within [0, 1]",
            ));
        }
        if !self.audio.attenuation.is_finite() || self.audio.attenuation < 0.0 {
            return Err(ReelError::validation("audio attenuation must be >= 0"));
        }
        Ok(())
    }

    pub fn post_canvas(&self) -> ReelResult<Canvas> {
        let d = self.instagram.feed_dimensions;
        Canvas::new(d.width, d.height, self.brand.colors.background)
    }

    pub fn reel_canvas(&self) -> ReelResult<Canvas> {
        let d = self.instagram.reel_dimensions;
        Canvas::new(d.width, d.height, self.brand.colors.background)
    }

    pub fn fit_config(&self) -> FitConfig {
        FitConfig {
            safety_margin_px: self.layout.safety_margin_px,
            verify_tolerance_px: self.layout.verify_tolerance_px,
            max_retries: self.layout.max_retries,
            ..FitConfig::default()
        }
    }

    pub fn placement_config(&self) -> PlacementConfig {
        PlacementConfig {
            padding_px: self.layout.padding_px,
            panel_padding_px: self.layout.panel_padding_px,
            panel_alpha: self.layout.panel_alpha,
            panel_color: self.brand.colors.background,
            attribution_gap_px: self.layout.attribution_gap_px,
        }
    }

    pub fn timeline_config(&self) -> TimelineConfig {
        let o = &self.overlay;
        TimelineConfig {
            min_duration_sec: self.instagram.reel_duration.min,
            max_duration_sec: self.instagram.reel_duration.max,
            segment_cap_sec: self.instagram.segment_cap_sec,
            reading: ReadingSpeed {
                words_per_sec: o.words_per_sec,
                chars_per_sec: o.chars_per_sec,
                extra_line_sec: o.extra_line_sec,
                floor_sec: o.min_duration_sec,
                ceiling_sec: o.max_duration_sec,
            },
            intro_fraction: o.intro_fraction,
            closing_fraction: o.closing_fraction,
            attenuation: self.audio.attenuation,
        }
    }

    /// Heading font for text laid over feed images.
    pub fn post_font(&self) -> FontSpec {
        FontSpec::new(&self.brand.fonts.heading, self.layout.post_font_size_px)
            .with_weight(FontWeight::Bold)
            .with_color(self.brand.colors.text)
    }

    pub fn quote_font(&self) -> FontSpec {
        FontSpec::new(&self.brand.fonts.heading, self.layout.quote_font_size_px)
            .with_weight(FontWeight::Bold)
            .with_color(self.brand.colors.primary)
    }

    pub fn author_font(&self) -> FontSpec {
        FontSpec::new(&self.brand.fonts.body, self.layout.author_font_size_px)
            .with_color(self.brand.colors.text)
    }

    /// Reel captions: text color with a background-colored outline.
    pub fn overlay_font(&self) -> FontSpec {
        FontSpec::new(&self.brand.fonts.heading, self.layout.overlay_font_size_px)
            .with_color(self.brand.colors.text)
            .with_stroke(Stroke {
                color: self.brand.colors.background,
                width_px: self.layout.overlay_stroke_px,
            })
    }

    /// Block spanning the canvas width minus horizontal padding on both sides.
    pub fn text_block(&self, text: &str, font: FontSpec, canvas: Canvas, anchor: Anchor) -> TextBlock {
        let max_width = (canvas.width_f() - 2.0 * self.layout.padding_px).max(1.0) as f32;
        TextBlock::new(text, font, max_width)
            .with_anchor(anchor)
            .with_padding(self.layout.padding_px as f32)
            .with_line_gap(self.layout.line_gap_px)
    }

    pub fn quote_block(&self, quote: &str, canvas: Canvas) -> TextBlock {
        let max_width = (canvas.width_f() - 2.0 * self.layout.quote_margin_px).max(1.0) as f32;
        TextBlock::new(quote, self.quote_font(), max_width)
            .with_anchor(Anchor::Center)
            .with_padding(self.layout.padding_px as f32)
            .with_line_gap(self.layout.quote_line_gap_px)
    }

    pub fn author_block(&self, author: &str, canvas: Canvas) -> TextBlock {
        let max_width = (canvas.width_f() - 2.0 * self.layout.quote_margin_px).max(1.0) as f32;
        TextBlock::new(format!("\u{2014} {author}"), self.author_font(), max_width)
            .with_anchor(Anchor::Center)
            .with_padding(self.layout.padding_px as f32)
            .with_line_gap(self.layout.line_gap_px)
    }

    /// Reel caption block; reels keep extra room on the sides for platform UI.
    pub fn overlay_block(&self, text: &str, canvas: Canvas, anchor: Anchor) -> TextBlock {
        let max_width = (canvas.width_f() - 100.0).max(1.0) as f32;
        TextBlock::new(text, self.overlay_font(), max_width)
            .with_anchor(anchor)
            .with_padding(self.layout.padding_px as f32)
            .with_line_gap(self.layout.line_gap_px)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
