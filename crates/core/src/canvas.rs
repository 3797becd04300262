//! Viewport geometry shared by the factory, the force model and the renderer.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Size of the interaction surface in pixels.
///
/// Replaced on every resize event; particle spawning, wrap-around and
/// viewport-scaled radii all read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    /// Returns `EngineError::InvalidDimensions` unless both sides are finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self, EngineError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(Self { width, height })
    }

    /// Integer-sized viewport, the common case for pixel surfaces.
    pub fn from_pixels(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::new(width as f64, height as f64)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Half-open containment: `0 <= x < width`, `0 <= y < height`.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width && p.y < self.height
    }

    /// `(width / divisor) * (height / divisor)`, the area-scaled length used
    /// by viewport-relative radii and connection distances.
    pub fn scaled_length(&self, divisor: f64) -> f64 {
        if divisor <= 0.0 {
            return 0.0;
        }
        (self.width / divisor) * (self.height / divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_degenerate_sizes() {
        assert!(matches!(
            Viewport::new(0.0, 10.0),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(Viewport::new(10.0, -1.0).is_err());
        assert!(Viewport::new(f64::NAN, 10.0).is_err());
        assert!(Viewport::new(f64::INFINITY, 10.0).is_err());
        assert!(Viewport::from_pixels(0, 5).is_err());
    }

    #[test]
    fn accessors_report_dimensions() {
        let vp = Viewport::from_pixels(1280, 720).unwrap();
        assert_eq!(vp.width(), 1280.0);
        assert_eq!(vp.height(), 720.0);
        assert_eq!(vp.area(), 1280.0 * 720.0);
        assert_eq!(vp.center(), DVec2::new(640.0, 360.0));
    }

    #[test]
    fn contains_is_half_open() {
        let vp = Viewport::new(10.0, 10.0).unwrap();
        assert!(vp.contains(DVec2::ZERO));
        assert!(vp.contains(DVec2::new(9.99, 9.99)));
        assert!(!vp.contains(DVec2::new(10.0, 5.0)));
        assert!(!vp.contains(DVec2::new(-0.01, 5.0)));
    }

    #[test]
    fn scaled_length_matches_area_rule() {
        let vp = Viewport::new(1600.0, 800.0).unwrap();
        assert_eq!(vp.scaled_length(80.0), 20.0 * 10.0);
        assert_eq!(vp.scaled_length(100.0), 16.0 * 8.0);
        assert_eq!(vp.scaled_length(0.0), 0.0);
    }

    #[test]
    fn serde_round_trip() {
        let vp = Viewport::new(640.0, 480.0).unwrap();
        let json = serde_json::to_string(&vp).unwrap();
        let back: Viewport = serde_json::from_str(&json).unwrap();
        assert_eq!(vp, back);
    }
}
