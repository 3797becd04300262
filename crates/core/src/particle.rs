//! Particle record and the population container.
//!
//! A [`Particle`] is plain data. The force model and the renderer are free
//! functions over it, so particles can be built and stepped in tests without
//! any drawing context.

use glam::DVec2;

use crate::color::Rgb8;

/// A live simulation entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    /// Rest position for return-to-origin behavior.
    pub anchor: Option<DVec2>,
    /// Render radius (or glyph scale).
    pub size: f64,
    /// Full color, from the source pixel or the preset.
    pub color: Rgb8,
    /// Color shown while idle; grayscale for variants that reveal color on contact.
    pub idle_color: Rgb8,
    /// Whether the particle has been inside the pointer radius.
    pub active: bool,
    /// Randomized pointer response strength.
    pub density: f64,
    /// Ambient velocity applied every frame.
    pub velocity: DVec2,
    /// Per-particle speed jitter added to field-driven movement.
    pub drift: f64,
    /// Last field brightness under the particle.
    pub speed: f64,
    /// Wiggle phase, advanced by field brightness.
    pub angle: f64,
    /// Uniform random in [0, 1) for render-time shape selection.
    pub roll: f64,
    /// Index into the glyph set for glyph-shaped variants.
    pub glyph: usize,
    pub opacity: f64,
    /// Last field color under the particle.
    pub field_color: Option<Rgb8>,
    /// Distance to the pointer at the last update; `None` while the pointer is absent.
    pub distance: Option<f64>,
}

impl Particle {
    /// A particle at rest at `position` with neutral attributes.
    pub fn at(position: DVec2) -> Self {
        Self {
            position,
            anchor: None,
            size: 1.0,
            color: Rgb8::WHITE,
            idle_color: Rgb8::WHITE,
            active: false,
            density: 1.0,
            velocity: DVec2::ZERO,
            drift: 0.0,
            speed: 0.0,
            angle: 0.0,
            roll: 0.0,
            glyph: 0,
            opacity: 1.0,
            field_color: None,
            distance: None,
        }
    }

    /// A particle resting on its anchor.
    pub fn anchored(anchor: DVec2) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::at(anchor)
        }
    }

    /// Distance to the anchor, 0 for unanchored particles.
    pub fn anchor_offset(&self) -> f64 {
        self.anchor
            .map(|a| self.position.distance(a))
            .unwrap_or(0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
    }
}

/// The current particle population.
///
/// Regeneration builds a complete replacement and swaps it in with
/// [`Population::replace`]; the old and new sets are never mixed.
#[derive(Debug, Clone, Default)]
pub struct Population {
    generation: u64,
    particles: Vec<Particle>,
}

impl Population {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            generation: 0,
            particles,
        }
    }

    /// Increments on every [`Population::replace`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Swaps in a whole new particle set and returns the old one.
    pub fn replace(&mut self, particles: Vec<Particle>) -> Vec<Particle> {
        self.generation += 1;
        std::mem::replace(&mut self.particles, particles)
    }
}
