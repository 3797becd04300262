//! Pointer state threaded explicitly into every force evaluation.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::canvas::Viewport;

/// Pointer position plus interaction radius.
///
/// `position` is `None` while the pointer is outside the surface, which the
/// force model treats as "no force". Every mutation bumps `version` so
/// observers can tell whether anything changed since they last looked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    position: Option<DVec2>,
    radius: f64,
    version: u64,
}

impl PointerState {
    /// An absent pointer with the given radius. Negative or NaN radii become 0.
    pub fn new(radius: f64) -> Self {
        Self {
            position: None,
            radius: sanitize_radius(radius),
            version: 0,
        }
    }

    pub fn position(&self) -> Option<DVec2> {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_present(&self) -> bool {
        self.position.is_some()
    }

    /// Moves the pointer. Non-finite coordinates are treated as leaving the surface.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = DVec2::new(x, y);
        self.position = p.is_finite().then_some(p);
        self.version += 1;
    }

    pub fn leave(&mut self) {
        self.position = None;
        self.version += 1;
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = sanitize_radius(radius);
        self.version += 1;
    }

    /// Distance from `p` to the pointer, `None` when absent.
    pub fn distance_to(&self, p: DVec2) -> Option<f64> {
        self.position.map(|m| m.distance(p))
    }
}

fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() && radius > 0.0 {
        radius
    } else {
        0.0
    }
}

/// How the interaction radius is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum RadiusRule {
    /// Constant radius in pixels.
    Fixed(f64),
    /// `(width / d) * (height / d)`, recomputed on resize.
    ViewportScaled(f64),
}

impl RadiusRule {
    pub fn resolve(&self, viewport: &Viewport) -> f64 {
        match *self {
            RadiusRule::Fixed(r) => r,
            RadiusRule::ViewportScaled(divisor) => viewport.scaled_length(divisor),
        }
    }
}

impl Default for RadiusRule {
    fn default() -> Self {
        RadiusRule::Fixed(100.0)
    }
}
