//! Software RGBA8 canvas implementing [`DrawContext`].
//!
//! This module is always available (no feature gate) so headless runs can
//! render frames without the `png` feature. Shapes are rasterized by testing
//! pixel centers; colors composite source-over with straight alpha.

use molecular_core::color::Rgba;
use molecular_core::error::EngineError;
use molecular_core::surface::{DrawContext, Paint, Rect};
use molecular_core::{Raster, Rgb8};
use glam::DVec2;

use crate::font;

/// Row-major RGBA8 pixel buffer, initially transparent.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA8 bytes, `width * height * 4` long.
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Paints every pixel opaque with `color`.
    pub fn fill(&mut self, color: Rgb8) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    /// Copies the canvas into a [`Raster`], e.g. to feed it back as a source.
    pub fn to_raster(&self) -> Result<Raster, EngineError> {
        Raster::new(self.width, self.height, self.data.clone())
    }

    fn extent(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgb8, alpha: f64) {
        let i = (y * self.width + x) * 4;
        let dst = &mut self.data[i..i + 4];
        let src_a = alpha.clamp(0.0, 1.0);
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }
        let mix = |s: u8, d: u8| {
            let v = (s as f64 * src_a + d as f64 * dst_a * (1.0 - src_a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Pixel index range covering `[lo, hi]` along an axis of length `len`.
    fn span(lo: f64, hi: f64, len: usize) -> std::ops::Range<usize> {
        if !(lo.is_finite() && hi.is_finite()) || hi < 0.0 {
            return 0..0;
        }
        let start = lo.floor().max(0.0) as usize;
        let end = (hi.ceil().max(0.0) as usize).min(len);
        start.min(end)..end
    }

    /// Blends `paint` into every pixel whose center satisfies `inside`.
    fn shade(
        &mut self,
        min: DVec2,
        max: DVec2,
        paint: &Paint,
        alpha: f64,
        inside: impl Fn(DVec2) -> bool,
    ) {
        if alpha <= 0.0 {
            return;
        }
        let extent = self.extent();
        for y in Self::span(min.y, max.y, self.height) {
            for x in Self::span(min.x, max.x, self.width) {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                if inside(center) {
                    let color = paint.color_at(center, extent);
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }
}

fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl DrawContext for PixelCanvas {
    fn size(&self) -> DVec2 {
        self.extent()
    }

    fn clear_rect(&mut self, rect: Rect) {
        for y in Self::span(rect.y, rect.y + rect.height, self.height) {
            for x in Self::span(rect.x, rect.x + rect.width, self.width) {
                let i = (y * self.width + x) * 4;
                self.data[i..i + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint, alpha: f64) {
        let min = DVec2::new(rect.x, rect.y);
        let max = min + DVec2::new(rect.width, rect.height);
        self.shade(min, max, paint, alpha, |c| {
            c.x >= min.x && c.x < max.x && c.y >= min.y && c.y < max.y
        });
    }

    fn stroke_rect(&mut self, rect: Rect, paint: &Paint, width: f64, alpha: f64) {
        let half = (width / 2.0).max(0.5);
        let min = DVec2::new(rect.x, rect.y);
        let max = min + DVec2::new(rect.width, rect.height);
        let outer = |c: DVec2| {
            c.x >= min.x - half && c.x < max.x + half && c.y >= min.y - half && c.y < max.y + half
        };
        let inner = |c: DVec2| {
            c.x > min.x + half && c.x < max.x - half && c.y > min.y + half && c.y < max.y - half
        };
        self.shade(
            min - DVec2::splat(half),
            max + DVec2::splat(half),
            paint,
            alpha,
            |c| outer(c) && !inner(c),
        );
    }

    fn fill_arc(&mut self, center: DVec2, radius: f64, paint: &Paint, alpha: f64) {
        if !(radius > 0.0) {
            return;
        }
        // Tiny dots still cover the pixel they sit in.
        let r = radius.max(0.5);
        self.shade(
            center - DVec2::splat(r),
            center + DVec2::splat(r),
            paint,
            alpha,
            |c| c.distance(center) <= r,
        );
    }

    fn stroke_arc(&mut self, center: DVec2, radius: f64, paint: &Paint, width: f64, alpha: f64) {
        if !(radius > 0.0) {
            return;
        }
        let half = (width / 2.0).max(0.5);
        let reach = radius + half;
        self.shade(
            center - DVec2::splat(reach),
            center + DVec2::splat(reach),
            paint,
            alpha,
            |c| (c.distance(center) - radius).abs() <= half,
        );
    }

    fn line(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f64) {
        let half = (width / 2.0).max(0.5);
        let paint = Paint::Solid(color.rgb);
        self.shade(
            from.min(to) - DVec2::splat(half),
            from.max(to) + DVec2::splat(half),
            &paint,
            color.alpha,
            |c| segment_distance(c, from, to) <= half,
        );
    }

    fn fill_text(&mut self, text: &str, at: DVec2, font_px: f64, paint: &Paint, alpha: f64) {
        if !(font_px > 0.0) || !at.is_finite() || alpha <= 0.0 {
            return;
        }
        let scale = ((font_px / font::GLYPH_HEIGHT as f64).round() as usize).max(1);
        // `at` is the baseline-left corner.
        let top = at.y - (font::GLYPH_HEIGHT * scale) as f64;
        let extent = self.extent();
        let (w, h) = (self.width as f64, self.height as f64);
        let mut lit = Vec::new();
        font::for_each_pixel(text, scale, |dx, dy| lit.push((dx, dy)));
        for (dx, dy) in lit {
            let x = (at.x + dx as f64).floor();
            let y = (top + dy as f64).floor();
            if x < 0.0 || y < 0.0 || x >= w || y >= h {
                continue;
            }
            let center = DVec2::new(x + 0.5, y + 0.5);
            let color = paint.color_at(center, extent);
            self.blend(x as usize, y as usize, color, alpha);
        }
    }
}
