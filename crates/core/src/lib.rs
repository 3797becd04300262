#![deny(unsafe_code)]
//! Core of the molecular particle engine.
//!
//! Turns an RGBA raster into a field of particles that drift, repel from the
//! pointer and spring back to their anchors. Provides the field sampler,
//! particle factory, force model, renderer over the [`DrawContext`] trait and
//! the [`Simulation`] loop controller, plus the `Xorshift64` PRNG, color
//! types, `Seed` run records and parameter helpers.

pub mod canvas;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod field;
pub mod force;
pub mod params;
pub mod particle;
pub mod pointer;
pub mod prng;
pub mod render;
pub mod sampler;
pub mod seed;
pub mod surface;

pub use canvas::Viewport;
pub use color::{Rgb8, Rgba};
pub use config::SimulationConfig;
pub use engine::{
    Event, EventSource, FrameClock, FrameStats, ManualStepper, RasterSource, Simulation,
    StaticRaster, TickSource,
};
pub use error::EngineError;
pub use field::{FieldCell, FieldGrid};
pub use particle::{Particle, Population};
pub use pointer::{PointerState, RadiusRule};
pub use prng::Xorshift64;
pub use sampler::{FieldSample, Raster, SamplerParams};
pub use seed::Seed;
pub use surface::{DrawContext, Paint, Rect};
