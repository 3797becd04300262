//! Complete simulation configuration.
//!
//! A [`SimulationConfig`] fixes every tunable of a run at construction time.
//! Variant presets in the engines crate are just functions returning one of
//! these, and the whole thing round-trips through JSON.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::factory::{Seeding, SpawnParams};
use crate::force::{ForceParams, Proximity, ReturnParams, SizeRule};
use crate::pointer::RadiusRule;
use crate::render::{Background, MaxDistance, RenderParams, Shape};
use crate::sampler::SamplerParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seeding: Seeding,
    pub spawn: SpawnParams,
    pub force: ForceParams,
    pub render: RenderParams,
    #[serde(default)]
    pub sampler: SamplerParams,
    pub pointer_radius: RadiusRule,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seeding: Seeding::FieldDriven {
                magnification: 10.0,
                offset: glam::DVec2::ZERO,
                center: false,
            },
            spawn: SpawnParams::default(),
            force: ForceParams::default(),
            render: RenderParams::default(),
            sampler: SamplerParams::default(),
            pointer_radius: RadiusRule::default(),
        }
    }
}

impl SimulationConfig {
    /// Checks every numeric knob for a usable domain.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.spawn.validate()?;

        match self.seeding {
            Seeding::FieldDriven {
                magnification,
                offset,
                ..
            } => {
                if !(magnification.is_finite() && magnification > 0.0) {
                    return Err(EngineError::invalid_param(
                        "magnification",
                        "must be a positive number",
                    ));
                }
                if !offset.is_finite() {
                    return Err(EngineError::invalid_param("offset", "must be finite"));
                }
            }
            Seeding::UniformRandom { edge_margin, .. } => {
                if !(edge_margin.is_finite() && edge_margin >= 0.0) {
                    return Err(EngineError::invalid_param(
                        "edge_margin",
                        "must be a non-negative number",
                    ));
                }
            }
            Seeding::Rain { .. } => {}
        }

        if self.force.field_drift.is_some() && self.seeding.is_field_driven() {
            return Err(EngineError::invalid_param(
                "field_drift",
                "field drift needs free particles; use rain or uniform seeding",
            ));
        }

        if let Some(ReturnParams { decay, .. }) = self.force.return_to_anchor {
            if !(decay > 0.0 && decay < 1.0) {
                return Err(EngineError::invalid_param(
                    "return_decay",
                    format!("{decay} is outside (0, 1)"),
                ));
            }
        }

        match self.force.proximity {
            Proximity::Repel { strength, .. } if !strength.is_finite() => {
                return Err(EngineError::invalid_param("strength", "must be finite"));
            }
            Proximity::Sidestep { step, edge_guard } if !(step.is_finite() && edge_guard.is_finite()) => {
                return Err(EngineError::invalid_param("sidestep", "must be finite"));
            }
            _ => {}
        }

        if !(self.force.inner_band.is_finite() && self.force.inner_band >= 0.0) {
            return Err(EngineError::invalid_param(
                "inner_band",
                "must be a non-negative number",
            ));
        }

        let visuals = &self.force.visuals;
        for (name, rule) in [
            ("active_size", visuals.active_size),
            ("hover_size", visuals.hover_size),
            ("idle_size", visuals.idle_size),
            ("returning_size", visuals.returning_size),
        ] {
            if let SizeRule::Fixed(v) | SizeRule::Random(v) = rule {
                if !(v.is_finite() && v >= 0.0) {
                    return Err(EngineError::invalid_param(name, "must be a non-negative number"));
                }
            }
        }

        match self.pointer_radius {
            RadiusRule::Fixed(r) | RadiusRule::ViewportScaled(r) if !(r.is_finite() && r > 0.0) => {
                return Err(EngineError::invalid_param(
                    "pointer_radius",
                    "must be a positive number",
                ));
            }
            _ => {}
        }

        if let Background::TrailFade { opacity, .. } = self.render.background {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(EngineError::invalid_param(
                    "trail_opacity",
                    format!("{opacity} is outside [0, 1]"),
                ));
            }
        }

        if let Shape::Glyph { glyphs, .. } = &self.render.shape {
            if glyphs.is_empty() {
                return Err(EngineError::invalid_param("glyphs", "at least one glyph is required"));
            }
        }

        if let Some(conn) = &self.render.connections {
            let (MaxDistance::Fixed(d) | MaxDistance::ViewportScaled(d)) = conn.max;
            if !(d.is_finite() && d > 0.0) {
                return Err(EngineError::invalid_param(
                    "connection_distance",
                    "must be a positive number",
                ));
            }
        }
        Ok(())
    }
}
