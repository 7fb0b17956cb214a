use crate::{
    canvas::placement,
    foundation::core::{Anchor, Canvas, Point},
    foundation::error::{Notice, ReelError, ReelResult},
    text::font::FontSpec,
    text::metrics::{FixedAdvanceMetrics, FontMetrics},
    text::segment,
};

const ELLIPSIS: &str = "...";

/// Knobs of the wrapping loop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Packing limit is `max_width - safety_margin_px` (kerning/AA overshoot).
    pub safety_margin_px: f32,
    /// Verification limit is `max_width - verify_tolerance_px`.
    pub verify_tolerance_px: f32,
    /// Midpoint re-splits allowed per line before truncating.
    pub max_retries: u32,
    /// Estimate used when the metrics provider fails.
    pub fallback_advance_ratio: f32,
    pub fallback_line_height_ratio: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        let fixed = FixedAdvanceMetrics::default();
        Self {
            safety_margin_px: 12.0,
            verify_tolerance_px: 2.0,
            max_retries: 3,
            fallback_advance_ratio: fixed.advance_ratio,
            fallback_line_height_ratio: fixed.line_height_ratio,
        }
    }
}

/// Source text plus everything needed to lay it out on a canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub font: FontSpec,
    pub max_width_px: f32,
    #[serde(default)]
    pub anchor: Anchor,
    /// Distance kept from the anchored top/bottom canvas edge.
    #[serde(default)]
    pub padding_px: f32,
    /// Shifts centered lines to the right.
    #[serde(default)]
    pub left_bias_px: Option<f32>,
    #[serde(default)]
    pub line_gap_px: f32,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, font: FontSpec, max_width_px: f32) -> Self {
        Self {
            text: text.into(),
            font,
            max_width_px,
            anchor: Anchor::default(),
            padding_px: 0.0,
            left_bias_px: None,
            line_gap_px: 0.0,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_padding(mut self, padding_px: f32) -> Self {
        self.padding_px = padding_px;
        self
    }

    pub fn with_left_bias(mut self, left_bias_px: f32) -> Self {
        self.left_bias_px = Some(left_bias_px);
        self
    }

    pub fn with_line_gap(mut self, line_gap_px: f32) -> Self {
        self.line_gap_px = line_gap_px;
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Line {
    pub text: String,
    pub width_px: f32,
    pub height_px: f32,
}

/// Wrapped lines and their geometry.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LayoutResult {
    pub lines: Vec<Line>,
    pub total_height_px: f32,
    pub line_gap_px: f32,
    /// Top-left corner of the first line on the canvas (zero until placed).
    pub origin: Point,
    pub notices: Vec<Notice>,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn widest_px(&self) -> f32 {
        self.lines.iter().map(|l| l.width_px).fold(0.0, f32::max)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Re-space the lines, recomputing the total height.
    pub fn with_line_gap(mut self, gap_px: f32) -> Self {
        self.line_gap_px = gap_px.max(0.0);
        self.total_height_px = stacked_height(&self.lines, self.line_gap_px);
        self
    }

    /// Joined line text, for logs and reading-time estimates.
    pub fn joined(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn stacked_height(lines: &[Line], gap: f32) -> f32 {
    if lines.is_empty() {
        return 0.0;
    }
    let body: f32 = lines.iter().map(|l| l.height_px).sum();
    body + gap * (lines.len() - 1) as f32
}

/// Wraps text into lines that fit a pixel width.
///
/// Measurement goes through the borrowed [`FontMetrics`]; if it fails, the whole fit is
/// redone with a fixed-advance estimate so every line is measured the same way.
pub struct TextFitter<'m> {
    metrics: &'m mut dyn FontMetrics,
    config: FitConfig,
}

impl<'m> TextFitter<'m> {
    pub fn new(metrics: &'m mut dyn FontMetrics, config: FitConfig) -> Self {
        Self { metrics, config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Wrap `text` so no line is wider than `max_width_px`. Never fails.
    #[tracing::instrument(skip(self, text, font), fields(chars = text.len(), family = %font.family))]
    pub fn fit(&mut self, text: &str, font: &FontSpec, max_width_px: f32) -> LayoutResult {
        let mut notices = Vec::new();

        if text.trim().is_empty() {
            return LayoutResult::default();
        }
        if !max_width_px.is_finite() || max_width_px <= 0.0 {
            tracing::warn!(max_width_px, "non-positive max width, nothing fits");
            return LayoutResult::default();
        }

        if let Some(substituted) = self.metrics.fallback_family(font) {
            notices.push(Notice::UnresolvedFont {
                requested: font.family.clone(),
                substituted,
            });
        }

        let lines = match wrap(&mut *self.metrics, &self.config, text, font, max_width_px) {
            Ok(w) => w,
            Err(e) => {
                notices.push(Notice::MeasurementFailure {
                    reason: e.to_string(),
                });
                let mut fixed = FixedAdvanceMetrics::new(
                    self.config.fallback_advance_ratio,
                    self.config.fallback_line_height_ratio,
                );
                let mut fixed_font = font.clone();
                if !fixed_font.size_px.is_finite() || fixed_font.size_px <= 0.0 {
                    fixed_font.size_px = 1.0;
                }
                match wrap(&mut fixed, &self.config, text, &fixed_font, max_width_px) {
                    Ok(w) => w,
                    Err(e) => {
                        tracing::warn!(error = %e, "fixed-advance fallback failed");
                        Wrapped::default()
                    }
                }
            }
        };

        notices.extend(
            lines
                .truncated
                .into_iter()
                .map(|original| Notice::Truncated { original }),
        );
        for n in &notices {
            n.log();
        }

        LayoutResult {
            total_height_px: stacked_height(&lines.lines, 0.0),
            lines: lines.lines,
            line_gap_px: 0.0,
            origin: Point::ZERO,
            notices,
        }
    }

    /// Fit `block` and position its first line on `canvas` according to its anchor.
    pub fn layout_block(&mut self, block: &TextBlock, canvas: Canvas) -> LayoutResult {
        let max_width = block.max_width_px.min(canvas.width as f32);
        let layout = self
            .fit(&block.text, &block.font, max_width)
            .with_line_gap(block.line_gap_px);
        place(layout, block, canvas)
    }
}

fn place(mut layout: LayoutResult, block: &TextBlock, canvas: Canvas) -> LayoutResult {
    let y = placement::vertical_origin(
        block.anchor,
        canvas.height_f(),
        f64::from(layout.total_height_px),
        f64::from(block.padding_px),
    );
    let first_width = layout.lines.first().map_or(0.0, |l| l.width_px);
    let x = placement::centered_x(
        canvas.width_f(),
        f64::from(first_width),
        block.left_bias_px.map_or(0.0, f64::from),
    );
    layout.origin = Point::new(x, y);
    layout
}

#[derive(Default)]
struct Wrapped {
    lines: Vec<Line>,
    truncated: Vec<String>,
}

struct Limits {
    pack: f32,
    verify: f32,
    hard: f32,
}

impl Limits {
    fn new(cfg: &FitConfig, max: f32) -> Self {
        // Margins never shrink the limit below half the width.
        let margin = |m: f32| (max - m.max(0.0)).max(max * 0.5);
        let verify = margin(cfg.verify_tolerance_px);
        Self {
            pack: margin(cfg.safety_margin_px).min(verify),
            verify,
            hard: max,
        }
    }
}

fn wrap(
    metrics: &mut dyn FontMetrics,
    cfg: &FitConfig,
    text: &str,
    font: &FontSpec,
    max_width: f32,
) -> ReelResult<Wrapped> {
    let limits = Limits::new(cfg, max_width);
    let mut width = |s: &str| -> ReelResult<f32> {
        let w = metrics.measure(font, s)?.width_px;
        if !w.is_finite() || w < 0.0 {
            return Err(ReelError::measurement(format!(
                "provider returned invalid width {w}"
            )));
        }
        Ok(w)
    };

    let mut packed = Vec::new();
    for paragraph in segment::paragraphs(text) {
        pack_paragraph(&mut width, &limits, paragraph, &mut packed)?;
    }

    let mut out = Wrapped::default();
    for line in packed {
        settle(&mut width, &limits, cfg.max_retries, line, &mut out)?;
    }

    // Heights come from a separate measure so providers may vary them per line.
    let mut lines = Vec::with_capacity(out.lines.len());
    for mut line in out.lines {
        let extent = metrics.measure(font, &line.text)?;
        line.height_px = extent.height_px.max(0.0);
        lines.push(line);
    }
    out.lines = lines;
    Ok(out)
}

fn join(current: &str, next: &str) -> String {
    if current.is_empty() {
        next.to_string()
    } else {
        format!("{current} {next}")
    }
}

fn pack_paragraph(
    width: &mut impl FnMut(&str) -> ReelResult<f32>,
    limits: &Limits,
    paragraph: &str,
    out: &mut Vec<String>,
) -> ReelResult<()> {
    let mut current = String::new();

    for chunk in segment::chunks(paragraph) {
        let candidate = join(&current, chunk);
        if width(&candidate)? <= limits.pack {
            current = candidate;
            continue;
        }
        if !current.is_empty() && width(chunk)? <= limits.pack {
            out.push(std::mem::take(&mut current));
            current = chunk.to_string();
            continue;
        }

        for word in chunk.split_whitespace() {
            let candidate = join(&current, word);
            if width(&candidate)? <= limits.pack {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if width(word)? <= limits.pack {
                current = word.to_string();
            } else {
                let mut pieces = split_chars(&mut *width, limits.pack, word)?;
                current = pieces.pop().unwrap_or_default();
                out.append(&mut pieces);
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    Ok(())
}

/// Break a single overlong token into the longest fitting character runs.
fn split_chars(
    width: &mut impl FnMut(&str) -> ReelResult<f32>,
    limit: f32,
    word: &str,
) -> ReelResult<Vec<String>> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        let mut candidate = current.clone();
        candidate.push(c);
        if current.is_empty() || width(&candidate)? <= limit {
            current = candidate;
        } else {
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    Ok(pieces)
}

/// Verify a packed line, splitting it at its middle word boundary while it is too wide.
fn settle(
    width: &mut impl FnMut(&str) -> ReelResult<f32>,
    limits: &Limits,
    retries_left: u32,
    line: String,
    out: &mut Wrapped,
) -> ReelResult<()> {
    let line = line.trim().to_string();
    if line.is_empty() {
        return Ok(());
    }

    let w = width(&line)?;
    if w <= limits.verify {
        out.lines.push(Line {
            text: line,
            width_px: w,
            height_px: 0.0,
        });
        return Ok(());
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if retries_left > 0 && words.len() >= 2 {
        let mid = words.len() / 2;
        let left = words[..mid].join(" ");
        let right = words[mid..].join(" ");
        settle(&mut *width, limits, retries_left - 1, left, out)?;
        return settle(&mut *width, limits, retries_left - 1, right, out);
    }

    match truncate_to_fit(&mut *width, limits, &line)? {
        Some((text, w)) => out.lines.push(Line {
            text,
            width_px: w,
            height_px: 0.0,
        }),
        None => tracing::debug!(%line, "dropping line: nothing fits"),
    }
    out.truncated.push(line);
    Ok(())
}

/// Longest prefix that still fits with an ellipsis appended.
///
/// Falls back to a bare prefix when even the ellipsis is too wide; `None` means not
/// a single character fits.
fn truncate_to_fit(
    width: &mut impl FnMut(&str) -> ReelResult<f32>,
    limits: &Limits,
    line: &str,
) -> ReelResult<Option<(String, f32)>> {
    let chars: Vec<char> = line.chars().collect();

    for suffix in [ELLIPSIS, ""] {
        let render = |n: usize| {
            let prefix: String = chars[..n].iter().collect();
            format!("{}{suffix}", prefix.trim_end())
        };

        // Widths grow with prefix length; binary search the largest fitting prefix.
        let (mut lo, mut hi) = (0usize, chars.len());
        let mut best: Option<(String, f32)> = None;
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let candidate = render(mid);
            let w = if candidate.is_empty() {
                0.0
            } else {
                width(&candidate)?
            };
            if w <= limits.verify && w <= limits.hard {
                if !candidate.is_empty() {
                    best = Some((candidate, w));
                }
                lo = mid + 1;
            } else if mid == 0 {
                break;
            } else {
                hi = mid - 1;
            }
        }
        if best.is_some() {
            return Ok(best);
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/unit/text/fitter.rs"]
mod tests;
