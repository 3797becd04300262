//! Built-in raster sources: bitmap text and a synthetic color swatch.

use molecular_core::engine::RasterSource;
use molecular_core::error::EngineError;
use molecular_core::{Raster, Rgb8, Viewport};

use crate::font;

/// Renders a string with the built-in bitmap font on a transparent background.
///
/// The raster is sized to the text plus `padding` on every side and does not
/// depend on the viewport; field-driven seeding magnifies it instead.
#[derive(Debug, Clone)]
pub struct TextRaster {
    pub text: String,
    pub color: Rgb8,
    /// Integer pixel scale of the 5x7 font.
    pub scale: usize,
    pub padding: usize,
}

impl TextRaster {
    pub fn new(text: &str, color: Rgb8) -> Self {
        Self {
            text: text.to_string(),
            color,
            scale: 2,
            padding: 1,
        }
    }

    pub fn render(&self) -> Result<Raster, EngineError> {
        if self.text.trim().is_empty() {
            return Err(EngineError::invalid_param("text", "must not be empty"));
        }
        if self.scale == 0 {
            return Err(EngineError::invalid_param("text_scale", "must be at least 1"));
        }
        let width = font::text_width(&self.text, self.scale) + 2 * self.padding;
        let height = font::GLYPH_HEIGHT * self.scale + 2 * self.padding;
        let mut rgba = vec![0u8; width * height * 4];
        let Rgb8 { r, g, b } = self.color;
        font::for_each_pixel(&self.text, self.scale, |x, y| {
            let i = ((y + self.padding) * width + x + self.padding) * 4;
            rgba[i..i + 4].copy_from_slice(&[r, g, b, 255]);
        });
        Raster::new(width, height, rgba)
    }
}

impl RasterSource for TextRaster {
    fn rasterize(&mut self, _viewport: &Viewport) -> Result<Raster, EngineError> {
        self.render()
    }
}

/// Opaque test image: a hue sweep left to right, darkening toward the bottom,
/// with a bright disc in the middle. Gives both image and rain variants
/// something to work with when no image is supplied.
pub fn swatch(width: usize, height: usize) -> Result<Raster, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let stops = [
        Rgb8::new(255, 0, 0),
        Rgb8::new(255, 165, 0),
        Rgb8::new(255, 255, 0),
        Rgb8::new(0, 128, 0),
        Rgb8::new(0, 255, 255),
        Rgb8::new(238, 130, 238),
    ];
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let disc = width.min(height) as f64 / 4.0;
    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let shade = 1.0 - 0.8 * (y as f64 / height as f64);
        for x in 0..width {
            let t = x as f64 / width as f64 * (stops.len() - 1) as f64;
            let i = (t.floor() as usize).min(stops.len() - 2);
            let hue = stops[i].lerp(stops[i + 1], t - i as f64);
            let dist = ((x as f64 + 0.5 - cx).powi(2) + (y as f64 + 0.5 - cy).powi(2)).sqrt();
            let c = if dist < disc {
                hue.lerp(Rgb8::WHITE, 0.6)
            } else {
                hue.lerp(Rgb8::BLACK, 1.0 - shade)
            };
            rgba.extend_from_slice(&[c.r, c.g, c.b, 255]);
        }
    }
    Raster::new(width, height, rgba)
}

/// Synthetic [`swatch`] as a raster source, either at a fixed size or
/// following the viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct Swatch {
    pub size: Option<(usize, usize)>,
}

impl RasterSource for Swatch {
    fn rasterize(&mut self, viewport: &Viewport) -> Result<Raster, EngineError> {
        let (w, h) = self.size.unwrap_or_else(|| viewport_pixels(viewport));
        swatch(w, h)
    }
}

/// Stretches a raster over the whole viewport, the way a picture is drawn
/// edge to edge before its brightness map is read.
#[derive(Debug, Clone)]
pub struct FitToViewport(pub Raster);

impl RasterSource for FitToViewport {
    fn rasterize(&mut self, viewport: &Viewport) -> Result<Raster, EngineError> {
        let (w, h) = viewport_pixels(viewport);
        resample_nearest(&self.0, w, h)
    }
}

fn viewport_pixels(viewport: &Viewport) -> (usize, usize) {
    let w = viewport.width().round().max(1.0) as usize;
    let h = viewport.height().round().max(1.0) as usize;
    (w, h)
}

/// Nearest-neighbor resize.
pub fn resample_nearest(src: &Raster, width: usize, height: usize) -> Result<Raster, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let sy = (y * src.height() / height).min(src.height() - 1);
        for x in 0..width {
            let sx = (x * src.width() / width).min(src.width() - 1);
            let px = src.pixel(sx, sy).unwrap_or([0, 0, 0, 0]);
            rgba.extend_from_slice(&px);
        }
    }
    Raster::new(width, height, rgba)
}
