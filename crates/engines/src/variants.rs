//! Preset configurations, one per named variant.
//!
//! Each function returns a complete [`SimulationConfig`]. The registry in
//! `lib.rs` picks one by name and layers JSON overrides on top.

use glam::DVec2;

use molecular_core::color::{Rgb8, Rgba};
use molecular_core::config::SimulationConfig;
use molecular_core::error::EngineError;
use molecular_core::factory::{CountRule, IdleColor, Interval, Seeding, SpawnParams};
use molecular_core::force::{
    Boundary, ColorReveal, FieldDrift, ForceParams, Proximity, ReturnParams, ReturnTarget,
    SizeRule, Visuals,
};
use molecular_core::pointer::RadiusRule;
use molecular_core::render::{
    Background, BubbleStyle, ConnectionParams, Fill, Highlight, InnerColor, MaxDistance, Opacity,
    RenderParams, Shape,
};
use molecular_core::sampler::SamplerParams;
use molecular_core::surface::{ColorStop, GradientAxis, LinearGradient, Paint};

const DEEP_BLUE: Rgb8 = Rgb8::new(0, 0, 119);
const GREEN: Rgb8 = Rgb8::new(0, 128, 0);
const CYAN: Rgb8 = Rgb8::new(0, 255, 255);
const ORANGE: Rgb8 = Rgb8::new(255, 165, 0);
const TURQUOISE: Rgb8 = Rgb8::new(64, 224, 208);

fn trail() -> Background {
    Background::TrailFade {
        color: Rgb8::BLACK,
        opacity: 0.05,
    }
}

fn repel(strength: f64, scale_by_radius: bool) -> Proximity {
    Proximity::Repel {
        strength,
        scale_by_radius,
    }
}

fn ease_back(decay: f64, target: ReturnTarget) -> Option<ReturnParams> {
    Some(ReturnParams { decay, target })
}

fn image_seeding(magnification: f64, offset: DVec2, center: bool) -> Seeding {
    Seeding::FieldDriven {
        magnification,
        offset,
        center,
    }
}

fn text_seeding() -> Seeding {
    image_seeding(10.0, DVec2::new(15.0, 24.0), false)
}

fn gradient(stops: &[(f64, Rgb8)]) -> Result<Paint, EngineError> {
    let stops = stops
        .iter()
        .map(|&(offset, color)| ColorStop { offset, color })
        .collect();
    Ok(Paint::Gradient(LinearGradient::new(GradientAxis::Diagonal, stops)?))
}

fn base(seeding: Seeding, spawn: SpawnParams, radius: RadiusRule) -> SimulationConfig {
    SimulationConfig {
        seeding,
        spawn,
        force: ForceParams::default(),
        render: RenderParams::default(),
        sampler: SamplerParams::default(),
        pointer_radius: radius,
    }
}

fn image_spawn(idle_color: IdleColor) -> SpawnParams {
    SpawnParams {
        density: Interval::new(2.0, 12.0),
        size: Interval::constant(2.0),
        idle_color,
        ..SpawnParams::default()
    }
}

pub fn image_color() -> SimulationConfig {
    let mut config = base(
        image_seeding(4.0, DVec2::ZERO, true),
        image_spawn(IdleColor::Same),
        RadiusRule::Fixed(100.0),
    );
    config.force.proximity = repel(0.6, false);
    config.force.pad_with_size = true;
    config.force.return_to_anchor = ease_back(1.0 / 20.0, ReturnTarget::Anchor);
    config.render.background = trail();
    config
}

pub fn image_brighten() -> SimulationConfig {
    let mut config = base(
        image_seeding(6.0, DVec2::new(30.0, 15.0), false),
        image_spawn(IdleColor::Grayscale),
        RadiusRule::Fixed(100.0),
    );
    config.force.proximity = repel(0.6, false);
    config.force.pad_with_size = true;
    config.force.return_to_anchor = ease_back(1.0 / 20.0, ReturnTarget::Anchor);
    config.force.visuals = Visuals {
        active_size: SizeRule::Fixed(2.5),
        returning_size: SizeRule::Fixed(3.0),
        reveal: ColorReveal::Sticky,
        ..Visuals::default()
    };
    config.render.background = trail();
    config
}

pub fn image_eraser() -> SimulationConfig {
    let mut config = base(
        image_seeding(6.0, DVec2::new(30.0, 15.0), false),
        image_spawn(IdleColor::Same),
        RadiusRule::Fixed(42.0),
    );
    config.force.proximity = repel(0.6, true);
    config.force.pad_with_size = true;
    config.force.return_to_anchor = ease_back(1.0 / 20.0, ReturnTarget::Ground);
    config.force.visuals = Visuals {
        active_size: SizeRule::Fixed(1.0),
        returning_size: SizeRule::Random(2.0),
        ..Visuals::default()
    };
    config.render.background = trail();
    config
}

fn text_spawn(size: f64, density: (f64, f64)) -> SpawnParams {
    SpawnParams {
        density: density.into(),
        size: Interval::constant(size),
        color: Rgb8::new(128, 0, 128),
        ..SpawnParams::default()
    }
}

/// Plain deep-blue dots over the text.
pub fn text_dots() -> SimulationConfig {
    let mut config = base(
        text_seeding(),
        text_spawn(3.0, (1.0, 31.0)),
        RadiusRule::Fixed(150.0),
    );
    config.render.fill = Fill::Fixed(Paint::Solid(DEEP_BLUE));
    config
}

pub fn text_connected() -> SimulationConfig {
    let mut config = text_dots();
    config.render.connections = Some(ConnectionParams {
        max: MaxDistance::Fixed(25.0),
        color: Rgb8::new(190, 80, 119),
        inner: Some(InnerColor {
            below: 15.0,
            color: DEEP_BLUE,
        }),
        line_width: 2.0,
        bucketed: false,
    });
    config
}

pub fn text_bubbles() -> SimulationConfig {
    let mut config = base(
        text_seeding(),
        text_spawn(4.0, (1.0, 9.0)),
        RadiusRule::Fixed(150.0),
    );
    config.force.visuals = Visuals {
        active_size: SizeRule::Fixed(10.0),
        idle_size: SizeRule::Fixed(4.0),
        ..Visuals::default()
    };
    config.render.shape = Shape::Bubble(BubbleStyle {
        ring: Paint::Solid(Rgb8::new(34, 147, 214)),
        line_width: 3.0,
        highlight: Rgba::new(Rgb8::new(255, 55, 255), 0.8),
        highlight_mode: Highlight::Disk,
        tier_sizes: Some([13.0, 10.0, 8.0]),
        band: 5.0,
    });
    config
}

pub fn text_eraser() -> Result<SimulationConfig, EngineError> {
    let mut config = base(
        text_seeding(),
        text_spawn(4.0, (1.0, 9.0)),
        RadiusRule::Fixed(42.0),
    );
    config.force.proximity = repel(1.0, true);
    config.force.return_to_anchor = ease_back(1.0 / 20.0, ReturnTarget::Ground);
    config.force.visuals = Visuals {
        active_size: SizeRule::Fixed(2.0),
        returning_size: SizeRule::Random(2.0),
        ..Visuals::default()
    };
    config.render.fill = Fill::Fixed(gradient(&[(0.0, GREEN), (0.5, CYAN), (1.0, ORANGE)])?);
    Ok(config)
}

pub fn text_eraser_bubbles() -> Result<SimulationConfig, EngineError> {
    let mut config = base(
        text_seeding(),
        text_spawn(3.0, (1.0, 9.0)),
        RadiusRule::Fixed(42.0),
    );
    config.force.proximity = repel(1.0, false);
    config.force.inner_band = 5.0;
    config.force.return_to_anchor = ease_back(1.0 / 10.0, ReturnTarget::Ground);
    config.force.visuals = Visuals {
        active_size: SizeRule::Fixed(7.0),
        hover_size: SizeRule::Fixed(6.0),
        idle_size: SizeRule::Fixed(3.0),
        returning_size: SizeRule::Fixed(0.0),
        reveal: ColorReveal::None,
    };
    let ring = gradient(&[
        (0.2, Rgb8::new(255, 192, 203)),
        (0.3, Rgb8::new(255, 0, 0)),
        (0.4, ORANGE),
        (0.5, Rgb8::new(255, 255, 0)),
        (0.6, GREEN),
        (0.7, TURQUOISE),
        (0.8, Rgb8::new(238, 130, 238)),
    ])?;
    config.render.shape = Shape::Bubble(BubbleStyle {
        ring,
        line_width: 3.0,
        highlight: Rgba::new(Rgb8::WHITE, 0.8),
        highlight_mode: Highlight::Spots,
        tier_sizes: None,
        band: 5.0,
    });
    Ok(config)
}

fn rain_spawn(size: (f64, f64)) -> SpawnParams {
    SpawnParams {
        size: size.into(),
        drift: Interval::new(0.0, 0.5),
        ..SpawnParams::default()
    }
}

fn rain_force(drift: FieldDrift) -> ForceParams {
    ForceParams {
        proximity: Proximity::None,
        field_drift: Some(drift),
        return_to_anchor: None,
        boundary: Boundary::Wrap,
        ..ForceParams::default()
    }
}

fn rain_render() -> RenderParams {
    RenderParams {
        background: trail(),
        fill: Fill::Field,
        opacity: Opacity::FromSpeed(0.5),
        ..RenderParams::default()
    }
}

pub fn rain_color() -> SimulationConfig {
    let mut config = base(
        Seeding::Rain {
            count: CountRule::Fixed(5000),
        },
        rain_spawn((0.5, 4.0)),
        RadiusRule::default(),
    );
    config.force = rain_force(FieldDrift::default());
    config.render = rain_render();
    config
}

fn tranquil_drift() -> FieldDrift {
    FieldDrift {
        y_factor: 1.0,
        wiggle: 3.0,
        angle_rate: 1.0 / 20.0,
        ..FieldDrift::default()
    }
}

pub fn rain_tranquil() -> SimulationConfig {
    let mut config = base(
        Seeding::Rain {
            count: CountRule::Fixed(5000),
        },
        rain_spawn((0.5, 2.0)),
        RadiusRule::default(),
    );
    config.force = rain_force(tranquil_drift());
    config.render = rain_render();
    config
}

pub fn rain_letters() -> SimulationConfig {
    let glyphs: Vec<String> = ["J", "I", "N", "X"].iter().map(|g| g.to_string()).collect();
    let mut config = base(
        Seeding::Rain {
            count: CountRule::Fixed(2000),
        },
        SpawnParams {
            glyph_count: glyphs.len(),
            ..rain_spawn((0.5, 2.0))
        },
        RadiusRule::default(),
    );
    config.force = rain_force(FieldDrift {
        size_from_speed: Some(1.5),
        ..tranquil_drift()
    });
    config.render = RenderParams {
        shape: Shape::Glyph {
            glyphs,
            font_px: 40.0,
        },
        opacity: Opacity::Opaque,
        ..rain_render()
    };
    config
}

pub fn zero_g() -> SimulationConfig {
    let mut config = base(
        Seeding::UniformRandom {
            count: CountRule::PerArea(9000.0),
            edge_margin: 2.0,
        },
        SpawnParams {
            size: Interval::new(1.0, 6.0),
            opacity: Interval::new(0.0, 1.0),
            velocity: Interval::new(-2.5, 2.5),
            ..SpawnParams::default()
        },
        RadiusRule::ViewportScaled(80.0),
    );
    config.force = ForceParams {
        proximity: Proximity::Sidestep {
            step: 10.0,
            edge_guard: 10.0,
        },
        pad_with_size: true,
        ambient: Some(0.5),
        return_to_anchor: None,
        boundary: Boundary::Bounce,
        ..ForceParams::default()
    };
    config.render = RenderParams {
        fill: Fill::Fixed(Paint::Solid(Rgb8::new(245, 155, 235))),
        opacity: Opacity::Particle,
        connections: Some(ConnectionParams {
            max: MaxDistance::ViewportScaled(100.0),
            color: Rgb8::new(90, 90, 90),
            inner: None,
            line_width: 1.0,
            bucketed: true,
        }),
        ..RenderParams::default()
    };
    config
}

fn scattered(count: usize) -> Seeding {
    Seeding::UniformRandom {
        count: CountRule::Fixed(count),
        edge_margin: 0.0,
    }
}

pub fn dots() -> SimulationConfig {
    let mut config = base(
        scattered(1000),
        SpawnParams {
            density: Interval::new(1.0, 31.0),
            ..SpawnParams::default()
        },
        RadiusRule::Fixed(150.0),
    );
    config.force.return_to_anchor = None;
    config.render.fill = Fill::Fixed(Paint::Solid(DEEP_BLUE));
    config
}

pub fn dots_inflate() -> SimulationConfig {
    let mut config = base(scattered(1000), SpawnParams::default(), RadiusRule::Fixed(100.0));
    config.force.proximity = Proximity::Inflate;
    config.force.return_to_anchor = None;
    config.force.visuals = Visuals {
        active_size: SizeRule::Fixed(8.0),
        idle_size: SizeRule::Fixed(3.0),
        ..Visuals::default()
    };
    config.render.fill = Fill::Fixed(Paint::Solid(TURQUOISE));
    config
}
