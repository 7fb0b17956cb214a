//! Pure geometry for canvas composition. Nothing here touches pixels.

use crate::{
    foundation::core::{Anchor, Canvas, Rect, Rgb8},
    text::fitter::LayoutResult,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub padding_px: f64,
    /// Added to the text box on each axis (half on every side).
    pub panel_padding_px: f64,
    pub panel_alpha: u8,
    pub panel_color: Rgb8,
    /// Space between a quote and its attribution.
    pub attribution_gap_px: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            padding_px: 40.0,
            panel_padding_px: 40.0,
            panel_alpha: 200,
            panel_color: Rgb8::WHITE,
            attribution_gap_px: 40.0,
        }
    }
}

/// Clamp into `[lo, hi]`, pinning to `lo` when the span is inverted.
fn clamp_span(v: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo { lo } else { v.clamp(lo, hi) }
}

/// Top edge of a block of height `block_h`, kept inside the canvas.
pub fn vertical_origin(anchor: Anchor, canvas_h: f64, block_h: f64, padding: f64) -> f64 {
    let y = match anchor {
        Anchor::Top => padding,
        Anchor::Center => (canvas_h - block_h) / 2.0,
        Anchor::Bottom => canvas_h - block_h - padding,
    };
    clamp_span(y, 0.0, canvas_h - block_h)
}

/// Left edge of a horizontally centered line, shifted by `left_bias` and kept inside the canvas.
pub fn centered_x(canvas_w: f64, line_w: f64, left_bias: f64) -> f64 {
    clamp_span((canvas_w - line_w) / 2.0 + left_bias, 0.0, canvas_w - line_w)
}

/// Where a resized source image lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ImagePlacement {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Shrink `src` to fit inside the canvas preserving aspect ratio, then center it.
///
/// Images already inside the canvas keep their size.
pub fn letterbox(src_w: u32, src_h: u32, canvas: Canvas) -> ImagePlacement {
    let sw = f64::from(src_w.max(1));
    let sh = f64::from(src_h.max(1));
    let scale = (canvas.width_f() / sw).min(canvas.height_f() / sh).min(1.0);

    let width = ((sw * scale).round() as u32).clamp(1, canvas.width);
    let height = ((sh * scale).round() as u32).clamp(1, canvas.height);
    ImagePlacement {
        width,
        height,
        x: (canvas.width - width) / 2,
        y: (canvas.height - height) / 2,
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct BlockPlacement {
    pub panel: Option<Rect>,
    pub lines: Vec<PlacedLine>,
}

impl BlockPlacement {
    /// Union of every line box.
    pub fn text_bounds(&self) -> Option<Rect> {
        self.lines.iter().map(|l| l.rect).reduce(|a, b| a.union(b))
    }
}

fn stack_lines(layout: &LayoutResult, top: f64, left_bias: f64, canvas: Canvas) -> Vec<PlacedLine> {
    let mut y = top;
    let gap = f64::from(layout.line_gap_px);
    let mut out = Vec::with_capacity(layout.lines.len());
    for line in &layout.lines {
        let w = f64::from(line.width_px);
        let h = f64::from(line.height_px);
        let x = centered_x(canvas.width_f(), w, left_bias);
        out.push(PlacedLine {
            text: line.text.clone(),
            rect: Rect::new(x, y, x + w, y + h),
        });
        y += h + gap;
    }
    out
}

/// Backing panel: widest line plus padding by block height plus padding, centered on the text.
pub fn panel_rect(layout: &LayoutResult, left_bias: f64, canvas: Canvas, cfg: &PlacementConfig) -> Option<Rect> {
    if layout.is_empty() {
        return None;
    }
    let w = f64::from(layout.widest_px()) + cfg.panel_padding_px;
    let h = f64::from(layout.total_height_px) + cfg.panel_padding_px;
    let cx = canvas.width_f() / 2.0 + left_bias;
    let top = layout.origin.y - cfg.panel_padding_px / 2.0;
    let rect = Rect::new(cx - w / 2.0, top, cx + w / 2.0, top + h).intersect(canvas.bounds());
    (rect.area() > 0.0).then_some(rect)
}

/// Lines of an already anchored layout (see `TextFitter::layout_block`), with an optional panel.
pub fn place_block(
    layout: &LayoutResult,
    left_bias: f64,
    canvas: Canvas,
    cfg: &PlacementConfig,
    with_panel: bool,
) -> BlockPlacement {
    BlockPlacement {
        panel: if with_panel {
            panel_rect(layout, left_bias, canvas, cfg)
        } else {
            None
        },
        lines: stack_lines(layout, layout.origin.y, left_bias, canvas),
    }
}

/// Quote above an optional attribution, positioned as one combined block.
pub fn place_stack(
    quote: &LayoutResult,
    attribution: Option<&LayoutResult>,
    anchor: Anchor,
    canvas: Canvas,
    cfg: &PlacementConfig,
) -> BlockPlacement {
    let quote_h = f64::from(quote.total_height_px);
    let attribution = attribution.filter(|a| !a.is_empty());
    let gap = if quote.is_empty() {
        0.0
    } else {
        cfg.attribution_gap_px
    };
    let combined = match attribution {
        Some(a) => quote_h + gap + f64::from(a.total_height_px),
        None => quote_h,
    };
    let top = vertical_origin(anchor, canvas.height_f(), combined, cfg.padding_px);

    let mut lines = stack_lines(quote, top, 0.0, canvas);
    if let Some(a) = attribution {
        lines.extend(stack_lines(a, top + quote_h + gap, 0.0, canvas));
    }
    BlockPlacement { panel: None, lines }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/placement.rs"]
mod tests;
