use crate::{
    foundation::error::{ReelError, ReelResult},
    text::font::FontSpec,
};

/// Measured size of a single unwrapped run of text, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TextExtent {
    pub width_px: f32,
    pub height_px: f32,
}

/// Font-metrics provider consumed by the fitter.
///
/// `measure` never wraps: the whole string is treated as one line. Implementations
/// resolve unknown families to a fallback family instead of failing; an `Err` means
/// metrics are unavailable altogether.
pub trait FontMetrics {
    fn measure(&mut self, font: &FontSpec, text: &str) -> ReelResult<TextExtent>;

    /// The family substituted for `font.family`, or `None` when it resolves as requested.
    fn fallback_family(&mut self, _font: &FontSpec) -> Option<String> {
        None
    }
}

impl<M: FontMetrics + ?Sized> FontMetrics for &mut M {
    fn measure(&mut self, font: &FontSpec, text: &str) -> ReelResult<TextExtent> {
        (**self).measure(font, text)
    }

    fn fallback_family(&mut self, font: &FontSpec) -> Option<String> {
        (**self).fallback_family(font)
    }
}

/// Conservative estimate: every code point advances by a fixed fraction of the font size.
///
/// Used when shaping is unavailable. The default ratio overestimates typical
/// proportional fonts, so fitted lines stay inside the limit when rendered for real.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMetrics {
    pub advance_ratio: f32,
    pub line_height_ratio: f32,
}

impl Default for FixedAdvanceMetrics {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl FixedAdvanceMetrics {
    pub fn new(advance_ratio: f32, line_height_ratio: f32) -> Self {
        Self {
            advance_ratio,
            line_height_ratio,
        }
    }
}

impl FontMetrics for FixedAdvanceMetrics {
    fn measure(&mut self, font: &FontSpec, text: &str) -> ReelResult<TextExtent> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(ReelError::measurement("font size_px must be finite and > 0"));
        }
        let chars = text.chars().count() as f32;
        let bold = if font.weight.is_bold() { 1.05 } else { 1.0 };
        Ok(TextExtent {
            width_px: chars * font.size_px * self.advance_ratio * bold,
            height_px: font.size_px * self.line_height_ratio,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/metrics.rs"]
mod tests;
