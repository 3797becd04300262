//! Loop Controller: owns the simulation state and drives frames.
//!
//! [`Simulation`] holds the viewport, pointer, field grid and particle
//! population. Pointer and resize events are applied synchronously through
//! [`Simulation::handle`]; [`Simulation::tick`] updates and draws every
//! particle in population order and then runs the connection pass.
//!
//! The cadence is pluggable: [`ManualStepper`] runs a fixed number of frames
//! for headless use and tests, [`FrameClock`] sleeps to a fixed frame rate and
//! never stops on its own.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::canvas::Viewport;
use crate::config::SimulationConfig;
use crate::error::EngineError;
use crate::factory::{spawn_population, SampleSet};
use crate::field::FieldGrid;
use crate::force::{update_particle, Regime};
use crate::particle::{Particle, Population};
use crate::pointer::PointerState;
use crate::prng::Xorshift64;
use crate::render::{begin_frame, connections, connections_bucketed, draw_connections, draw_particle};
use crate::sampler::{sample_raster, Raster};
use crate::surface::DrawContext;

/// Host input delivered to a running simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    Resized { width: f64, height: f64 },
}

/// Produces the source raster for the current viewport.
///
/// Called once at construction and again on every resize. Text sources can
/// re-render at the new size; image sources usually return the same pixels.
pub trait RasterSource {
    fn rasterize(&mut self, viewport: &Viewport) -> Result<Raster, EngineError>;
}

/// A raster that does not depend on the viewport.
#[derive(Debug, Clone)]
pub struct StaticRaster(pub Raster);

impl RasterSource for StaticRaster {
    fn rasterize(&mut self, _viewport: &Viewport) -> Result<Raster, EngineError> {
        Ok(self.0.clone())
    }
}

/// Decides when the next frame runs.
pub trait TickSource {
    /// Blocks until the next frame is due; `false` ends the run.
    fn next_tick(&mut self) -> bool;
}

/// Runs exactly `frames` frames without waiting.
#[derive(Debug, Clone)]
pub struct ManualStepper {
    remaining: usize,
}

impl ManualStepper {
    pub fn new(frames: usize) -> Self {
        Self { remaining: frames }
    }
}

impl TickSource for ManualStepper {
    fn next_tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Fixed-rate display clock. Never ends a run.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Option<Instant>,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// A clock ticking `fps` times per second; `fps` of 0 is treated as 1.
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }
}

impl TickSource for FrameClock {
    fn next_tick(&mut self) -> bool {
        let now = Instant::now();
        let due = self.next.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        // A late frame resets the schedule instead of bursting to catch up.
        self.next = Some(due.max(now) + self.interval);
        true
    }
}

/// Non-blocking source of host events.
pub trait EventSource {
    fn poll(&mut self) -> Option<Event>;
}

impl EventSource for VecDeque<Event> {
    fn poll(&mut self) -> Option<Event> {
        self.pop_front()
    }
}

impl EventSource for Receiver<Event> {
    fn poll(&mut self) -> Option<Event> {
        self.try_recv().ok()
    }
}

/// Counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub particles: usize,
    pub in_proximity: usize,
    pub hovering: usize,
    pub connections: usize,
}

/// A running particle field.
pub struct Simulation {
    config: SimulationConfig,
    source: Box<dyn RasterSource>,
    viewport: Viewport,
    pointer: PointerState,
    population: Population,
    grid: Option<FieldGrid>,
    rng: Xorshift64,
    frame: u64,
}

impl Simulation {
    /// Validates the config, samples the source and spawns the first population.
    pub fn new(
        config: SimulationConfig,
        mut source: Box<dyn RasterSource>,
        viewport: Viewport,
        seed: u64,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = Xorshift64::new(seed);
        let (particles, grid) = generate(&config, source.as_mut(), &viewport, &mut rng)?;
        let pointer = PointerState::new(config.pointer_radius.resolve(&viewport));
        Ok(Self {
            config,
            source,
            viewport,
            pointer,
            population: Population::new(particles),
            grid,
            rng,
            frame: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn particles(&self) -> &[Particle] {
        self.population.particles()
    }

    pub fn grid(&self) -> Option<&FieldGrid> {
        self.grid.as_ref()
    }

    /// Number of frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Applies an event immediately; the next tick observes it.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::PointerMoved { x, y } => self.pointer.move_to(x, y),
            Event::PointerLeft => self.pointer.leave(),
            Event::Resized { width, height } => self.resize(width, height),
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        let viewport = match Viewport::new(width, height) {
            Ok(v) => v,
            Err(err) => {
                warn!(width, height, %err, "ignoring resize to degenerate viewport");
                return;
            }
        };
        self.viewport = viewport;
        self.pointer
            .set_radius(self.config.pointer_radius.resolve(&viewport));

        match generate(&self.config, self.source.as_mut(), &viewport, &mut self.rng) {
            Ok((particles, grid)) => {
                let previous = self.population.replace(particles);
                self.grid = grid;
                debug!(
                    width,
                    height,
                    previous = previous.len(),
                    particles = self.population.len(),
                    generation = self.population.generation(),
                    "regenerated population"
                );
            }
            Err(err) => {
                warn!(width, height, %err, "regeneration failed, keeping previous population");
            }
        }
    }

    /// Updates and draws one frame.
    pub fn tick(&mut self, ctx: &mut dyn DrawContext) -> FrameStats {
        let Self {
            config,
            viewport,
            pointer,
            population,
            grid,
            rng,
            ..
        } = self;

        begin_frame(ctx, &config.render.background);

        let mut stats = FrameStats {
            frame: self.frame,
            particles: population.len(),
            ..FrameStats::default()
        };
        for particle in population.particles_mut() {
            match update_particle(particle, pointer, grid.as_ref(), viewport, &config.force, rng) {
                Regime::Proximity => stats.in_proximity += 1,
                Regime::Hover => stats.hovering += 1,
                Regime::Away => {}
            }
            draw_particle(ctx, particle, &config.render, pointer.radius());
        }

        if let Some(conn) = &config.render.connections {
            let particles = population.particles();
            let lines = if conn.bucketed {
                connections_bucketed(particles, conn, viewport)
            } else {
                connections(particles, conn, viewport)
            };
            stats.connections = lines.len();
            draw_connections(ctx, particles, &lines, conn.line_width);
        }

        self.frame += 1;
        trace!(
            frame = stats.frame,
            proximity = stats.in_proximity,
            connections = stats.connections,
            "frame"
        );
        stats
    }

    /// Drains pending events before every frame until `ticks` stops.
    /// Returns the number of frames run.
    pub fn run(
        &mut self,
        ticks: &mut dyn TickSource,
        events: &mut dyn EventSource,
        ctx: &mut dyn DrawContext,
    ) -> u64 {
        let start = self.frame;
        while ticks.next_tick() {
            while let Some(event) = events.poll() {
                self.handle(event);
            }
            self.tick(ctx);
        }
        self.frame - start
    }
}

/// Runs the sampler and the factory for `viewport`.
fn generate(
    config: &SimulationConfig,
    source: &mut dyn RasterSource,
    viewport: &Viewport,
    rng: &mut Xorshift64,
) -> Result<(Vec<Particle>, Option<FieldGrid>), EngineError> {
    let field_driven = config.seeding.is_field_driven();
    let needs_grid = config.force.field_drift.is_some();
    if !field_driven && !needs_grid {
        let particles = spawn_population(&config.seeding, &config.spawn, None, viewport, rng)?;
        return Ok((particles, None));
    }

    let raster = source.rasterize(viewport)?;
    let grid = needs_grid.then(|| FieldGrid::from_raster(&raster));
    let samples = if field_driven {
        sample_raster(&raster, config.sampler)
    } else {
        Vec::new()
    };
    let set = field_driven.then(|| SampleSet {
        samples: &samples,
        source_width: raster.width(),
        source_height: raster.height(),
    });
    let particles = spawn_population(&config.seeding, &config.spawn, set, viewport, rng)?;
    debug!(
        samples = samples.len(),
        particles = particles.len(),
        grid = grid.is_some(),
        "sampled raster"
    );
    Ok((particles, grid))
}
