use image::DynamicImage;

use crate::{
    canvas::placement::{self, BlockPlacement, PlacementConfig},
    canvas::raster::Frame,
    foundation::core::Canvas,
    foundation::error::{Notice, ReelResult},
    text::fitter::{FitConfig, LayoutResult, TextBlock, TextFitter},
    text::font::FontSpec,
    text::library::FontLibrary,
};

/// A finished canvas plus the geometry that produced it.
#[derive(Clone, Debug)]
pub struct Composition {
    pub frame: Frame,
    pub placement: BlockPlacement,
    pub notices: Vec<Notice>,
}

/// Draws fitted text (and optionally a base image) onto fixed-size canvases.
pub struct CanvasComposer<'f> {
    fonts: &'f mut FontLibrary,
    fit: FitConfig,
    placement: PlacementConfig,
}

impl<'f> CanvasComposer<'f> {
    pub fn new(fonts: &'f mut FontLibrary, fit: FitConfig, placement: PlacementConfig) -> Self {
        Self {
            fonts,
            fit,
            placement,
        }
    }

    pub fn layout(&mut self, block: &TextBlock, canvas: Canvas) -> LayoutResult {
        TextFitter::new(&mut *self.fonts, self.fit.clone()).layout_block(block, canvas)
    }

    /// Letterboxed base image with the block on a translucent panel.
    ///
    /// `base` is shrunk to fit (never enlarged) and centered; `None` leaves the plain
    /// background.
    #[tracing::instrument(skip_all, fields(w = canvas.width, h = canvas.height, anchor = ?block.anchor))]
    pub fn compose_image_post(
        &mut self,
        base: Option<&DynamicImage>,
        block: &TextBlock,
        canvas: Canvas,
    ) -> ReelResult<Composition> {
        let layout = self.layout(block, canvas);
        let mut frame = Frame::filled(canvas);
        if let Some(img) = base {
            let at = placement::letterbox(img.width(), img.height(), canvas);
            tracing::debug!(?at, "placing base image");
            frame.draw_image(img, at);
        }

        let bias = block.left_bias_px.map_or(0.0, f64::from);
        let placed = placement::place_block(&layout, bias, canvas, &self.placement, true);
        if let Some(panel) = placed.panel {
            frame.fill_rect(
                panel,
                self.placement
                    .panel_color
                    .with_alpha(self.placement.panel_alpha),
            );
        }
        self.draw_lines(&mut frame, &placed, &block.font, 0..placed.lines.len())?;

        Ok(Composition {
            frame,
            placement: placed,
            notices: layout.notices,
        })
    }

    /// Quote above an optional attribution on a plain background.
    #[tracing::instrument(skip_all, fields(w = canvas.width, h = canvas.height))]
    pub fn compose_quote_card(
        &mut self,
        quote: &TextBlock,
        attribution: Option<&TextBlock>,
        canvas: Canvas,
    ) -> ReelResult<Composition> {
        let quote_layout = self.layout(quote, canvas);
        let attribution_layout = attribution.map(|a| self.layout(a, canvas));

        let placed = placement::place_stack(
            &quote_layout,
            attribution_layout.as_ref(),
            quote.anchor,
            canvas,
            &self.placement,
        );

        let mut frame = Frame::filled(canvas);
        let split = quote_layout.line_count();
        self.draw_lines(&mut frame, &placed, &quote.font, 0..split)?;
        if let Some(a) = attribution {
            self.draw_lines(&mut frame, &placed, &a.font, split..placed.lines.len())?;
        }

        let mut notices = quote_layout.notices;
        if let Some(a) = attribution_layout {
            notices.extend(a.notices);
        }
        Ok(Composition {
            frame,
            placement: placed,
            notices,
        })
    }

    /// Transparent full-canvas frame holding only the laid-out text.
    pub fn render_overlay(
        &mut self,
        layout: &LayoutResult,
        block: &TextBlock,
        canvas: Canvas,
    ) -> ReelResult<Frame> {
        let bias = block.left_bias_px.map_or(0.0, f64::from);
        let placed = placement::place_block(layout, bias, canvas, &self.placement, false);
        let mut frame = Frame::transparent(canvas.width, canvas.height);
        self.draw_lines(&mut frame, &placed, &block.font, 0..placed.lines.len())?;
        Ok(frame)
    }

    fn draw_lines(
        &mut self,
        frame: &mut Frame,
        placed: &BlockPlacement,
        font: &FontSpec,
        range: std::ops::Range<usize>,
    ) -> ReelResult<()> {
        if range.is_empty() {
            return Ok(());
        }
        for line in &placed.lines[range] {
            let shaped = self.fonts.shape_line(font, &line.text)?;
            frame.draw_text_line(
                &shaped,
                line.rect.x0,
                line.rect.y0,
                font.color,
                font.stroke,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/composer.rs"]
mod tests;
