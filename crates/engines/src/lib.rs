#![deny(unsafe_code)]
//! Variant registry: maps variant names to preset configurations and provides
//! the software canvas, built-in raster sources and PNG snapshots.
//!
//! This crate sits between `molecular-core` (which defines the simulation)
//! and its front ends. The CLI depends on it to avoid duplicating dispatch
//! logic.

pub mod font;
pub mod pixel;
pub mod source;
pub mod variants;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::DVec2;
use serde_json::{json, Value};
use tracing::debug;

use molecular_core::color::Rgb8;
use molecular_core::config::SimulationConfig;
use molecular_core::error::EngineError;
use molecular_core::factory::{CountRule, Interval, Seeding};
use molecular_core::force::Proximity;
use molecular_core::params::{param_bool, param_f64, param_interval, param_string, param_u8};
use molecular_core::pointer::RadiusRule;
use molecular_core::render::{Background, MaxDistance};

/// All available variant names.
const VARIANT_NAMES: &[&str] = &[
    "image-color",
    "image-brighten",
    "image-eraser",
    "text-dots",
    "text-connected",
    "text-bubbles",
    "text-eraser",
    "text-eraser-bubbles",
    "rain-color",
    "rain-tranquil",
    "rain-letters",
    "zero-g",
    "dots",
    "dots-inflate",
];

/// Word rendered for text variants when the caller supplies none.
pub const DEFAULT_TEXT: &str = "Habibi";

/// What a variant needs rasterized before it can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A picture: particles take its colors (image and rain variants).
    Image,
    /// A word drawn with the built-in font.
    Text,
    /// Nothing; particles are scattered at random.
    None,
}

/// Enumeration of all named particle-field variants.
///
/// Use [`VariantKind::from_name`] for string-based construction (CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    ImageColor,
    ImageBrighten,
    ImageEraser,
    TextDots,
    TextConnected,
    TextBubbles,
    TextEraser,
    TextEraserBubbles,
    RainColor,
    RainTranquil,
    RainLetters,
    ZeroG,
    Dots,
    DotsInflate,
}

impl VariantKind {
    /// Looks a variant up by name.
    ///
    /// Returns `EngineError::UnknownVariant` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        let kind = match name {
            "image-color" => VariantKind::ImageColor,
            "image-brighten" => VariantKind::ImageBrighten,
            "image-eraser" => VariantKind::ImageEraser,
            "text-dots" => VariantKind::TextDots,
            "text-connected" => VariantKind::TextConnected,
            "text-bubbles" => VariantKind::TextBubbles,
            "text-eraser" => VariantKind::TextEraser,
            "text-eraser-bubbles" => VariantKind::TextEraserBubbles,
            "rain-color" => VariantKind::RainColor,
            "rain-tranquil" => VariantKind::RainTranquil,
            "rain-letters" => VariantKind::RainLetters,
            "zero-g" => VariantKind::ZeroG,
            "dots" => VariantKind::Dots,
            "dots-inflate" => VariantKind::DotsInflate,
            _ => return Err(EngineError::UnknownVariant(name.to_string())),
        };
        Ok(kind)
    }

    /// Returns a slice of all recognized variant names.
    pub fn list_variants() -> &'static [&'static str] {
        VARIANT_NAMES
    }

    pub fn name(self) -> &'static str {
        match self {
            VariantKind::ImageColor => "image-color",
            VariantKind::ImageBrighten => "image-brighten",
            VariantKind::ImageEraser => "image-eraser",
            VariantKind::TextDots => "text-dots",
            VariantKind::TextConnected => "text-connected",
            VariantKind::TextBubbles => "text-bubbles",
            VariantKind::TextEraser => "text-eraser",
            VariantKind::TextEraserBubbles => "text-eraser-bubbles",
            VariantKind::RainColor => "rain-color",
            VariantKind::RainTranquil => "rain-tranquil",
            VariantKind::RainLetters => "rain-letters",
            VariantKind::ZeroG => "zero-g",
            VariantKind::Dots => "dots",
            VariantKind::DotsInflate => "dots-inflate",
        }
    }

    pub fn source_kind(self) -> SourceKind {
        match self {
            VariantKind::ImageColor
            | VariantKind::ImageBrighten
            | VariantKind::ImageEraser
            | VariantKind::RainColor
            | VariantKind::RainTranquil
            | VariantKind::RainLetters => SourceKind::Image,
            VariantKind::TextDots
            | VariantKind::TextConnected
            | VariantKind::TextBubbles
            | VariantKind::TextEraser
            | VariantKind::TextEraserBubbles => SourceKind::Text,
            VariantKind::ZeroG | VariantKind::Dots | VariantKind::DotsInflate => SourceKind::None,
        }
    }

    /// The unmodified preset.
    pub fn preset(self) -> Result<SimulationConfig, EngineError> {
        let config = match self {
            VariantKind::ImageColor => variants::image_color(),
            VariantKind::ImageBrighten => variants::image_brighten(),
            VariantKind::ImageEraser => variants::image_eraser(),
            VariantKind::TextDots => variants::text_dots(),
            VariantKind::TextConnected => variants::text_connected(),
            VariantKind::TextBubbles => variants::text_bubbles(),
            VariantKind::TextEraser => variants::text_eraser()?,
            VariantKind::TextEraserBubbles => variants::text_eraser_bubbles()?,
            VariantKind::RainColor => variants::rain_color(),
            VariantKind::RainTranquil => variants::rain_tranquil(),
            VariantKind::RainLetters => variants::rain_letters(),
            VariantKind::ZeroG => variants::zero_g(),
            VariantKind::Dots => variants::dots(),
            VariantKind::DotsInflate => variants::dots_inflate(),
        };
        Ok(config)
    }

    /// Builds the preset and layers the JSON overrides of
    /// [`VariantKind::param_schema`] on top, then validates the result.
    ///
    /// Keys that do not apply to the variant (say `magnification` on a rain
    /// variant) are ignored; missing or mistyped keys keep the preset value.
    pub fn config(self, params: &Value) -> Result<SimulationConfig, EngineError> {
        let mut config = self.preset()?;
        apply_overrides(&mut config, params)?;
        config.validate()?;
        debug!(variant = self.name(), %params, "built variant config");
        Ok(config)
    }

    /// Override keys with their type, preset default and description.
    pub fn param_schema(self) -> Result<Value, EngineError> {
        let config = self.preset()?;
        let mut schema = json!({
            "radius": {
                "type": "number",
                "default": radius_value(config.pointer_radius),
                "min": 1.0,
                "description": "Pointer interaction radius in px (fixed, replaces viewport scaling)"
            },
            "density": interval_schema(config.spawn.density, "Per-particle response density range [min, max)"),
            "size": interval_schema(config.spawn.size, "Initial particle size range [min, max)"),
            "drift": interval_schema(config.spawn.drift, "Per-particle drift offset range [min, max)"),
            "velocity": interval_schema(config.spawn.velocity, "Ambient velocity range per axis [min, max)"),
            "opacity": interval_schema(config.spawn.opacity, "Per-particle opacity range [min, max)"),
            "color": {
                "type": "string",
                "default": config.spawn.color.to_hex(),
                "description": "Color for particles not derived from a field sample (name, #hex or rgb(r, g, b))"
            },
            "alpha_threshold": {
                "type": "integer",
                "default": config.sampler.alpha_threshold,
                "min": 0,
                "max": 255,
                "description": "Raster pixels with alpha above this spawn particles"
            }
        });
        let Some(entries) = schema.as_object_mut() else {
            return Ok(schema);
        };

        match config.seeding {
            Seeding::FieldDriven {
                magnification,
                offset,
                center,
            } => {
                entries.insert("magnification".into(), json!({
                    "type": "number",
                    "default": magnification,
                    "min": 0.1,
                    "max": 50.0,
                    "description": "Raster-to-screen scale"
                }));
                entries.insert("offset_x".into(), json!({
                    "type": "number",
                    "default": offset.x,
                    "description": "Horizontal offset in raster pixels, applied before magnification"
                }));
                entries.insert("offset_y".into(), json!({
                    "type": "number",
                    "default": offset.y,
                    "description": "Vertical offset in raster pixels, applied before magnification"
                }));
                entries.insert("center".into(), json!({
                    "type": "boolean",
                    "default": center,
                    "description": "Center the magnified raster in the viewport"
                }));
            }
            Seeding::UniformRandom { count, .. } | Seeding::Rain { count } => {
                let default = match count {
                    CountRule::Fixed(n) => json!(n),
                    CountRule::PerArea(_) => Value::Null,
                };
                entries.insert("count".into(), json!({
                    "type": "integer",
                    "default": default,
                    "min": 0,
                    "description": "Number of particles (replaces any per-area rule)"
                }));
            }
        }
        if let Some(ret) = config.force.return_to_anchor {
            entries.insert("decay".into(), json!({
                "type": "number",
                "default": ret.decay,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of the remaining distance closed per frame on return"
            }));
        }
        if let Proximity::Repel { strength, .. } = config.force.proximity {
            entries.insert("strength".into(), json!({
                "type": "number",
                "default": strength,
                "min": 0.0,
                "max": 10.0,
                "description": "Repulsion multiplier"
            }));
        }
        if let Background::TrailFade { opacity, .. } = config.render.background {
            entries.insert("trail_opacity".into(), json!({
                "type": "number",
                "default": opacity,
                "min": 0.0,
                "max": 1.0,
                "description": "Opacity of the per-frame fade overlay"
            }));
        }
        if let Some(conn) = &config.render.connections {
            entries.insert("connection_distance".into(), json!({
                "type": "number",
                "default": max_distance_value(conn.max),
                "min": 1.0,
                "description": "Maximum distance for connection lines in px (fixed)"
            }));
            entries.insert("bucketed".into(), json!({
                "type": "boolean",
                "default": conn.bucketed,
                "description": "Find connections through a spatial grid instead of all pairs"
            }));
        }
        Ok(schema)
    }
}

fn interval_schema(interval: Interval, description: &str) -> Value {
    json!({
        "type": "interval",
        "default": [interval.min, interval.max],
        "description": description
    })
}

fn radius_value(rule: RadiusRule) -> Value {
    match rule {
        RadiusRule::Fixed(r) => json!(r),
        RadiusRule::ViewportScaled(_) => Value::Null,
    }
}

fn max_distance_value(max: MaxDistance) -> Value {
    match max {
        MaxDistance::Fixed(d) => json!(d),
        MaxDistance::ViewportScaled(_) => Value::Null,
    }
}

fn apply_overrides(config: &mut SimulationConfig, params: &Value) -> Result<(), EngineError> {
    if params.get("radius").and_then(Value::as_f64).is_some() {
        config.pointer_radius = RadiusRule::Fixed(param_f64(params, "radius", 0.0));
    }

    match &mut config.seeding {
        Seeding::FieldDriven {
            magnification,
            offset,
            center,
        } => {
            *magnification = param_f64(params, "magnification", *magnification);
            *offset = DVec2::new(
                param_f64(params, "offset_x", offset.x),
                param_f64(params, "offset_y", offset.y),
            );
            *center = param_bool(params, "center", *center);
        }
        Seeding::UniformRandom { count, .. } | Seeding::Rain { count } => {
            if let Some(n) = params.get("count").and_then(Value::as_u64) {
                let n = usize::try_from(n)
                    .map_err(|_| EngineError::invalid_param("count", "too large"))?;
                *count = CountRule::Fixed(n);
            }
        }
    }

    let spawn = &mut config.spawn;
    for (name, interval) in [
        ("density", &mut spawn.density),
        ("size", &mut spawn.size),
        ("drift", &mut spawn.drift),
        ("velocity", &mut spawn.velocity),
        ("opacity", &mut spawn.opacity),
    ] {
        *interval = param_interval(params, name, (interval.min, interval.max)).into();
    }
    if params.get("color").is_some() {
        spawn.color = Rgb8::parse(&param_string(params, "color", ""))?;
    }

    config.sampler.alpha_threshold =
        param_u8(params, "alpha_threshold", config.sampler.alpha_threshold);

    if let Some(ret) = &mut config.force.return_to_anchor {
        ret.decay = param_f64(params, "decay", ret.decay);
    }
    if let Proximity::Repel { strength, .. } = &mut config.force.proximity {
        *strength = param_f64(params, "strength", *strength);
    }
    if let Background::TrailFade { opacity, .. } = &mut config.render.background {
        *opacity = param_f64(params, "trail_opacity", *opacity);
    }
    if let Some(conn) = &mut config.render.connections {
        if params.get("connection_distance").and_then(Value::as_f64).is_some() {
            conn.max = MaxDistance::Fixed(param_f64(params, "connection_distance", 0.0));
        }
        conn.bucketed = param_bool(params, "bucketed", conn.bucketed);
    }
    Ok(())
}
