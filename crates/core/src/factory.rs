//! Particle Factory: builds a whole population from field samples or at random.
//!
//! Three seeding strategies are supported:
//!
//! - [`Seeding::FieldDriven`]: one anchored particle per field sample, placed
//!   at the sample's grid coordinate scaled by a magnification factor.
//! - [`Seeding::UniformRandom`]: a fixed (or area-derived) number of
//!   particles scattered over the viewport.
//! - [`Seeding::Rain`]: particles spread along the top edge, which the field
//!   drift then carries across the viewport.
//!
//! All randomness comes from the caller's [`Xorshift64`], so a population is
//! reproducible from the simulation seed.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::Viewport;
use crate::color::Rgb8;
use crate::error::EngineError;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::sampler::FieldSample;

/// Half-open interval `[min, max)` for per-particle random attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Degenerate interval that always yields `value`.
    pub const fn constant(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn sample(&self, rng: &mut Xorshift64) -> f64 {
        rng.next_range(self.min, self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<(f64, f64)> for Interval {
    fn from((min, max): (f64, f64)) -> Self {
        Interval::new(min, max)
    }
}

/// How many particles a random seeding produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum CountRule {
    Fixed(usize),
    /// One particle per `divisor` square pixels of viewport, rounded up.
    PerArea(f64),
}

impl CountRule {
    pub fn resolve(&self, viewport: &Viewport) -> usize {
        match *self {
            CountRule::Fixed(n) => n,
            CountRule::PerArea(divisor) if divisor > 0.0 => {
                (viewport.area() / divisor).ceil() as usize
            }
            CountRule::PerArea(_) => 0,
        }
    }
}

/// Initial placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Seeding {
    FieldDriven {
        /// Grid-to-screen scale (4, 6 and 10 are typical).
        magnification: f64,
        /// Offset in source-pixel units, applied before magnification.
        offset: DVec2,
        /// Center the magnified source horizontally and vertically in the viewport.
        center: bool,
    },
    UniformRandom {
        count: CountRule,
        /// Keep spawn positions this many particle sizes away from the edges.
        edge_margin: f64,
    },
    Rain {
        count: CountRule,
    },
}

impl Seeding {
    /// Whether the population is derived from field samples.
    pub fn is_field_driven(&self) -> bool {
        matches!(self, Seeding::FieldDriven { .. })
    }
}

/// Idle color derived from the full color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleColor {
    #[default]
    Same,
    Grayscale,
}

/// Per-particle randomized attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    pub density: Interval,
    pub size: Interval,
    pub drift: Interval,
    /// Sampled independently for each velocity axis.
    pub velocity: Interval,
    pub opacity: Interval,
    /// Color for particles not derived from a field sample.
    pub color: Rgb8,
    pub idle_color: IdleColor,
    /// Size of the glyph set to pick from; 0 disables glyph selection.
    pub glyph_count: usize,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            density: Interval::new(1.0, 31.0),
            size: Interval::constant(3.0),
            drift: Interval::constant(0.0),
            velocity: Interval::constant(0.0),
            opacity: Interval::constant(1.0),
            color: Rgb8::WHITE,
            idle_color: IdleColor::Same,
            glyph_count: 0,
        }
    }
}

impl SpawnParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        let intervals = [
            ("density", self.density),
            ("size", self.size),
            ("drift", self.drift),
            ("velocity", self.velocity),
            ("opacity", self.opacity),
        ];
        for (name, interval) in intervals {
            if !interval.is_valid() {
                return Err(EngineError::invalid_param(
                    name,
                    format!("[{}, {}) is not a valid interval", interval.min, interval.max),
                ));
            }
        }
        if self.density.min <= 0.0 {
            return Err(EngineError::invalid_param(
                "density",
                "response density must be positive",
            ));
        }
        Ok(())
    }

    /// Draws the randomized attributes onto a freshly placed particle.
    fn roll(&self, mut particle: Particle, rng: &mut Xorshift64) -> Particle {
        particle.density = self.density.sample(rng);
        particle.size = self.size.sample(rng);
        particle.drift = self.drift.sample(rng);
        particle.velocity = DVec2::new(self.velocity.sample(rng), self.velocity.sample(rng));
        particle.opacity = self.opacity.sample(rng);
        particle.roll = rng.next_f64();
        particle.glyph = rng.next_index(self.glyph_count);
        particle
    }

    fn paint(&self, mut particle: Particle, color: Rgb8) -> Particle {
        particle.color = color;
        particle.idle_color = match self.idle_color {
            IdleColor::Same => color,
            IdleColor::Grayscale => color.grayscale(),
        };
        particle
    }
}

/// Field samples together with the size of the raster they came from.
#[derive(Debug, Clone, Copy)]
pub struct SampleSet<'a> {
    pub samples: &'a [FieldSample],
    pub source_width: usize,
    pub source_height: usize,
}

/// Builds a complete population.
///
/// Field-driven seeding requires `samples`; the other strategies ignore it.
pub fn spawn_population(
    seeding: &Seeding,
    spawn: &SpawnParams,
    samples: Option<SampleSet<'_>>,
    viewport: &Viewport,
    rng: &mut Xorshift64,
) -> Result<Vec<Particle>, EngineError> {
    spawn.validate()?;
    let particles = match *seeding {
        Seeding::FieldDriven {
            magnification,
            offset,
            center,
        } => {
            let set = samples.ok_or_else(|| {
                EngineError::invalid_param("seeding", "field-driven seeding needs field samples")
            })?;
            spawn_field_driven(set, magnification, offset, center, spawn, viewport, rng)?
        }
        Seeding::UniformRandom { count, edge_margin } => {
            let n = count.resolve(viewport);
            (0..n)
                .map(|_| {
                    let p = spawn.roll(Particle::at(DVec2::ZERO), rng);
                    let margin = (p.size * edge_margin).max(0.0);
                    let place = |rng: &mut Xorshift64, extent: f64| {
                        if extent > 2.0 * margin {
                            rng.next_range(margin, extent - margin)
                        } else {
                            rng.next_range(0.0, extent)
                        }
                    };
                    let x = place(rng, viewport.width());
                    let y = place(rng, viewport.height());
                    spawn.paint(Particle { position: DVec2::new(x, y), ..p }, spawn.color)
                })
                .collect()
        }
        Seeding::Rain { count } => {
            let n = count.resolve(viewport);
            (0..n)
                .map(|_| {
                    let p = spawn.roll(Particle::at(DVec2::ZERO), rng);
                    let x = rng.next_range(0.0, viewport.width());
                    spawn.paint(Particle { position: DVec2::new(x, 0.0), ..p }, spawn.color)
                })
                .collect()
        }
    };
    debug!(count = particles.len(), "spawned population");
    Ok(particles)
}

fn spawn_field_driven(
    set: SampleSet<'_>,
    magnification: f64,
    offset: DVec2,
    center: bool,
    spawn: &SpawnParams,
    viewport: &Viewport,
    rng: &mut Xorshift64,
) -> Result<Vec<Particle>, EngineError> {
    if !(magnification.is_finite() && magnification > 0.0) {
        return Err(EngineError::invalid_param(
            "magnification",
            "must be finite and positive",
        ));
    }
    let shift = if center {
        let block = DVec2::new(set.source_width as f64, set.source_height as f64) * magnification;
        (DVec2::new(viewport.width(), viewport.height()) - block) * 0.5
    } else {
        DVec2::ZERO
    };
    Ok(set
        .samples
        .iter()
        .map(|s| {
            let grid = DVec2::new(s.col as f64, s.row as f64);
            let anchor = (grid + offset) * magnification + shift;
            let p = spawn.roll(Particle::anchored(anchor), rng);
            let mut p = spawn.paint(p, s.color);
            p.speed = s.brightness;
            p
        })
        .collect())
}
