//! Field Sampler: turns an RGBA raster into per-pixel field samples.
//!
//! The raster is produced by the host (a decoded image, or text already drawn
//! into a pixel buffer). Sampling reads it without mutation and keeps one
//! [`FieldSample`] per pixel whose alpha passes the inclusion threshold.

use serde::{Deserialize, Serialize};

use crate::color::Rgb8;
use crate::error::EngineError;

/// Default alpha inclusion threshold: a pixel is kept when `alpha > 128`.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

/// Brightness of pure white, `sqrt(255²) / 100`.
pub const MAX_BRIGHTNESS: f64 = 2.55;

/// Pre-rasterized RGBA8 pixel buffer in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl Raster {
    /// Wraps an RGBA buffer, validating that it holds `width * height * 4` bytes.
    pub fn new(width: usize, height: usize, rgba: Vec<u8>) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        if rgba.len() != expected {
            return Err(EngineError::RasterSizeMismatch {
                width,
                height,
                expected,
                got: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A raster filled with one RGBA value.
    pub fn filled(width: usize, height: usize, pixel: [u8; 4]) -> Result<Self, EngineError> {
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Self::new(width, height, pixel.repeat(len))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ])
    }

    /// Iterates `(x, y, rgba)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, [u8; 4])> + '_ {
        self.rgba.chunks_exact(4).enumerate().map(|(i, px)| {
            (
                i % self.width,
                i / self.width,
                [px[0], px[1], px[2], px[3]],
            )
        })
    }
}

/// Sampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerParams {
    /// Pixels with `alpha > alpha_threshold` are included.
    pub alpha_threshold: u8,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

/// One included source pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    pub row: usize,
    pub col: usize,
    /// Perceptual brightness in [0, [`MAX_BRIGHTNESS`]].
    pub brightness: f64,
    pub color: Rgb8,
}

/// Perceptually weighted brightness, `sqrt(0.299 r² + 0.587 g² + 0.114 b²) / 100`.
pub fn relative_brightness(r: u8, g: u8, b: u8) -> f64 {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    (0.299 * r * r + 0.587 * g * g + 0.114 * b * b).sqrt() / 100.0
}

/// Samples every pixel whose alpha exceeds the threshold, in row-major order.
pub fn sample_raster(raster: &Raster, params: SamplerParams) -> Vec<FieldSample> {
    raster
        .pixels()
        .filter(|(_, _, px)| px[3] > params.alpha_threshold)
        .map(|(col, row, [r, g, b, _])| FieldSample {
            row,
            col,
            brightness: relative_brightness(r, g, b),
            color: Rgb8::new(r, g, b),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_from(width: usize, height: usize, pixels: &[[u8; 4]]) -> Raster {
        Raster::new(width, height, pixels.concat()).unwrap()
    }

    #[test]
    fn raster_rejects_bad_sizes() {
        assert!(matches!(
            Raster::new(0, 4, vec![]),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(matches!(
            Raster::new(2, 2, vec![0; 15]),
            Err(EngineError::RasterSizeMismatch { expected: 16, got: 15, .. })
        ));
        assert!(Raster::new(usize::MAX, 2, vec![]).is_err());
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let r = raster_from(2, 1, &[[1, 2, 3, 4], [5, 6, 7, 8]]);
        assert_eq!(r.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(r.pixel(2, 0), None);
        assert_eq!(r.pixel(0, 1), None);
    }

    #[test]
    fn brightness_of_white_and_black() {
        assert!((relative_brightness(255, 255, 255) - MAX_BRIGHTNESS).abs() < 1e-9);
        assert_eq!(relative_brightness(0, 0, 0), 0.0);
    }

    #[test]
    fn brightness_weights_green_heaviest() {
        let r = relative_brightness(255, 0, 0);
        let g = relative_brightness(0, 255, 0);
        let b = relative_brightness(0, 0, 255);
        assert!(g > r && r > b);
    }

    #[test]
    fn inclusion_threshold_is_strict() {
        let r = raster_from(
            3,
            1,
            &[[10, 10, 10, 200], [20, 20, 20, 100], [30, 30, 30, 128]],
        );
        let samples = sample_raster(&r, SamplerParams::default());
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].col, 0);
        assert_eq!(samples[0].color, Rgb8::new(10, 10, 10));
    }

    #[test]
    fn custom_threshold_is_respected() {
        let r = raster_from(2, 1, &[[0, 0, 0, 100], [0, 0, 0, 20]]);
        let samples = sample_raster(&r, SamplerParams { alpha_threshold: 50 });
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn samples_are_row_major_with_coordinates() {
        let r = Raster::filled(3, 2, [0, 0, 0, 255]).unwrap();
        let coords: Vec<(usize, usize)> = sample_raster(&r, SamplerParams::default())
            .iter()
            .map(|s| (s.row, s.col))
            .collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn sampling_leaves_raster_untouched() {
        let r = Raster::filled(4, 4, [9, 8, 7, 255]).unwrap();
        let before = r.clone();
        let _ = sample_raster(&r, SamplerParams::default());
        assert_eq!(r, before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn brightness_is_bounded(r: u8, g: u8, b: u8) {
                let v = relative_brightness(r, g, b);
                prop_assert!((0.0..=MAX_BRIGHTNESS + 1e-9).contains(&v));
            }
        }
    }
}
