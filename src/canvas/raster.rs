use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::{
    canvas::placement::ImagePlacement,
    foundation::core::{Canvas, Rect, Rgb8, Rgba8Premul},
    foundation::error::{ReelError, ReelResult},
    foundation::math::{mul_div255_u8, over},
    text::font::Stroke,
    text::library::ShapedLine,
};

/// RGBA8 pixel buffer, premultiplied alpha, row-major with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Opaque frame filled with the canvas background.
    pub fn filled(canvas: Canvas) -> Self {
        let mut f = Self::transparent(canvas.width, canvas.height);
        let px = canvas.background.opaque().to_array();
        for chunk in f.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        f
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let mut data = img.as_raw().clone();
        premultiply_in_place(&mut data);
        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    /// Resize `img` to `at` and draw it over this frame.
    pub fn draw_image(&mut self, img: &DynamicImage, at: ImagePlacement) {
        let rgba = img.to_rgba8();
        let rgba = if rgba.width() == at.width && rgba.height() == at.height {
            rgba
        } else {
            image::imageops::resize(&rgba, at.width, at.height, FilterType::Lanczos3)
        };
        let src = Self::from_rgba_image(&rgba);
        self.composite_over(&src, i64::from(at.x), i64::from(at.y), 1.0);
    }

    /// Blend a solid color over every pixel the (pixel-snapped) rectangle covers.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8Premul) {
        let x0 = rect.x0.round().max(0.0) as u32;
        let y0 = rect.y0.round().max(0.0) as u32;
        let x1 = (rect.x1.round().max(0.0) as u32).min(self.width);
        let y1 = (rect.y1.round().max(0.0) as u32).min(self.height);
        let src = color.to_array();
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            for x in x0..x1 {
                let i = (row + x as usize) * 4;
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over(dst, src, 1.0));
            }
        }
    }

    /// Source-over `src` at integer offset `(dx, dy)`; out-of-bounds pixels are clipped.
    pub fn composite_over(&mut self, src: &Frame, dx: i64, dy: i64, opacity: f32) {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        for sy in 0..i64::from(src.height) {
            let ty = sy + dy;
            if ty < 0 || ty >= h {
                continue;
            }
            for sx in 0..i64::from(src.width) {
                let tx = sx + dx;
                if tx < 0 || tx >= w {
                    continue;
                }
                let si = ((sy * i64::from(src.width) + sx) * 4) as usize;
                let di = ((ty * w + tx) * 4) as usize;
                let s = [
                    src.data[si],
                    src.data[si + 1],
                    src.data[si + 2],
                    src.data[si + 3],
                ];
                if s[3] == 0 {
                    continue;
                }
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&over(d, s, opacity));
            }
        }
    }

    /// Rasterize one shaped line with its top-left corner at `(x, y)`.
    ///
    /// The stroke is approximated by filling the glyphs at offsets around the
    /// outline, then the fill is drawn on top.
    pub fn draw_text_line(
        &mut self,
        line: &ShapedLine,
        x: f64,
        y: f64,
        fill: Rgb8,
        stroke: Option<Stroke>,
    ) -> ReelResult<()> {
        if line.glyphs.is_empty() {
            return Ok(());
        }

        let stroke = stroke.filter(|s| s.width_px.is_finite() && s.width_px > 0.0);
        let pad = stroke.map_or(0.0, |s| f64::from(s.width_px).ceil()) + 2.0;
        let w = (f64::from(line.width_px) + 2.0 * pad).ceil();
        let h = (f64::from(line.height_px) + 2.0 * pad).ceil();
        if !(w >= 1.0 && h >= 1.0 && w <= f64::from(u16::MAX) && h <= f64::from(u16::MAX)) {
            return Err(ReelError::validation(format!(
                "text line box {w}x{h} is out of range"
            )));
        }
        let (w16, h16) = (w as u16, h as u16);

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(line.face.bytes.as_ref().clone()),
            0,
        );
        let glyphs = || {
            line.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            })
        };

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        if let Some(s) = stroke {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                s.color.r, s.color.g, s.color.b, 255,
            ));
            for (ox, oy) in stroke_offsets(f64::from(s.width_px)) {
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((pad + ox, pad + oy)));
                ctx.glyph_run(&font)
                    .font_size(line.size_px)
                    .fill_glyphs(glyphs());
            }
        }
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(fill.r, fill.g, fill.b, 255));
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((pad, pad)));
        ctx.glyph_run(&font)
            .font_size(line.size_px)
            .fill_glyphs(glyphs());
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        let src = Frame {
            width: u32::from(w16),
            height: u32::from(h16),
            data: pixmap.data_as_u8_slice().to_vec(),
        };
        self.composite_over(
            &src,
            (x - pad).round() as i64,
            (y - pad).round() as i64,
            1.0,
        );
        Ok(())
    }

    /// Straight-alpha copy for encoders.
    pub fn to_rgba_image(&self) -> ReelResult<RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_in_place(&mut data);
        RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ReelError::validation("frame buffer does not match its dimensions"))
    }
}

/// Ring of offsets approximating an outline of radius `width`.
fn stroke_offsets(width: f64) -> Vec<(f64, f64)> {
    let steps = ((width * 8.0).ceil() as usize).clamp(8, 32);
    (0..steps)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / steps as f64;
            (width * a.cos(), width * a.sin())
        })
        .collect()
}

fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        match a {
            255 => {}
            0 => {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
            }
            _ => {
                for c in &mut px[..3] {
                    *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/raster.rs"]
mod tests;
