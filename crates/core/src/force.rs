//! Force Model: per-frame displacement of a single particle.
//!
//! [`update_particle`] is a pure transformation of a [`Particle`] given the
//! pointer, the optional field grid and the viewport. One call applies, in
//! order:
//!
//! 1. field drift (brightness-driven rain movement and wiggle),
//! 2. the bounce check on the ambient velocity,
//! 3. the pointer regime: proximity push, hover, or return toward the anchor,
//! 4. ambient velocity,
//! 5. wrap-around at the far edges.
//!
//! Field drift and pointer repulsion compose additively when both are
//! configured. No step can leave a non-finite position behind: a zero
//! pointer distance skips the push, and any non-finite result restores the
//! previous position.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::canvas::Viewport;
use crate::field::FieldGrid;
use crate::particle::Particle;
use crate::pointer::PointerState;
use crate::prng::Xorshift64;
use crate::sampler::MAX_BRIGHTNESS;

/// Response inside the interaction radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Proximity {
    /// No pointer interaction.
    None,
    /// Push away along the pointer direction by
    /// `force * density * strength`, with `force = (r - d) / r`.
    /// `scale_by_radius` multiplies the push by the radius ("eraser" variants).
    Repel { strength: f64, scale_by_radius: bool },
    /// Step a fixed distance away on each axis, staying `size * edge_guard`
    /// away from the viewport edges.
    Sidestep { step: f64, edge_guard: f64 },
    /// Change visuals only.
    Inflate,
}

/// Vertical target of the return step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnTarget {
    /// Ease back to the anchor.
    #[default]
    Anchor,
    /// Ease x back to the anchor but let y fall to the bottom edge.
    Ground,
}

/// Exponential ease toward the anchor while outside the radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnParams {
    /// Fraction of the remaining offset removed per frame, in (0, 1).
    pub decay: f64,
    pub target: ReturnTarget,
}

/// Brightness-driven movement over a [`FieldGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldDrift {
    /// Brightness ceiling; `max - local + drift` is the per-frame movement.
    pub max_brightness: f64,
    pub x_factor: f64,
    pub y_factor: f64,
    /// Amplitude of the `cos`/`sin` wiggle added to each axis.
    pub wiggle: f64,
    /// Wiggle phase advance per unit of brightness.
    pub angle_rate: f64,
    /// When set, `size = speed * factor` every frame.
    pub size_from_speed: Option<f64>,
}

impl Default for FieldDrift {
    fn default() -> Self {
        Self {
            max_brightness: MAX_BRIGHTNESS,
            x_factor: 1.0,
            y_factor: 1.0 / 3.0,
            wiggle: 0.0,
            angle_rate: 0.0,
            size_from_speed: None,
        }
    }
}

/// Edge behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    #[default]
    None,
    /// Past the bottom or right edge, re-enter at the top or left at a random offset.
    Wrap,
    /// Invert the velocity component that left the viewport.
    Bounce,
}

/// Size assignment for a visual state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SizeRule {
    #[default]
    Keep,
    Fixed(f64),
    /// Uniform in [0, max), re-rolled every frame.
    Random(f64),
}

impl SizeRule {
    fn apply(&self, size: &mut f64, rng: &mut Xorshift64) {
        match *self {
            SizeRule::Keep => {}
            SizeRule::Fixed(v) => *size = v,
            SizeRule::Random(max) => *size = rng.next_range(0.0, max),
        }
    }
}

/// Whether contact switches a particle to its full color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorReveal {
    #[default]
    None,
    /// Full color only while inside the radius.
    WhileNear,
    /// Full color from first contact on.
    Sticky,
}

/// Size and color changes per regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Visuals {
    pub active_size: SizeRule,
    pub hover_size: SizeRule,
    pub idle_size: SizeRule,
    /// Applied after `idle_size` on frames where the particle is still easing back.
    pub returning_size: SizeRule,
    pub reveal: ColorReveal,
}

/// Full force configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceParams {
    pub proximity: Proximity,
    /// Extend the trigger distance by the particle's size.
    pub pad_with_size: bool,
    /// Width of the hover band just inside the radius; 0 disables it.
    pub inner_band: f64,
    pub field_drift: Option<FieldDrift>,
    /// Scale applied to `velocity` each frame; `None` disables ambient motion.
    pub ambient: Option<f64>,
    pub return_to_anchor: Option<ReturnParams>,
    pub boundary: Boundary,
    pub visuals: Visuals,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            proximity: Proximity::Repel {
                strength: 1.0,
                scale_by_radius: false,
            },
            pad_with_size: false,
            inner_band: 0.0,
            field_drift: None,
            ambient: None,
            return_to_anchor: Some(ReturnParams {
                decay: 0.1,
                target: ReturnTarget::Anchor,
            }),
            boundary: Boundary::None,
            visuals: Visuals::default(),
        }
    }
}

/// The pointer regime a particle was in during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Inside the trigger distance; the proximity response applied.
    Proximity,
    /// Inside the radius but within the outer hover band.
    Hover,
    /// Outside the radius, or no pointer.
    Away,
}

/// Advances one particle by one frame and returns the regime it was in.
pub fn update_particle(
    particle: &mut Particle,
    pointer: &PointerState,
    grid: Option<&FieldGrid>,
    viewport: &Viewport,
    params: &ForceParams,
    rng: &mut Xorshift64,
) -> Regime {
    let previous = particle.position;

    if let Some(drift) = &params.field_drift {
        apply_field_drift(particle, drift, grid);
    }

    if params.boundary == Boundary::Bounce {
        bounce(particle, viewport);
    }

    let regime = classify(particle, pointer, params);
    match regime {
        Regime::Proximity => {
            apply_proximity(particle, pointer, viewport, &params.proximity);
            params.visuals.active_size.apply(&mut particle.size, rng);
            if params.visuals.reveal != ColorReveal::None {
                particle.active = true;
            }
        }
        Regime::Hover => params.visuals.hover_size.apply(&mut particle.size, rng),
        Regime::Away => {
            params.visuals.idle_size.apply(&mut particle.size, rng);
            if params.visuals.reveal == ColorReveal::WhileNear {
                particle.active = false;
            }
            if let Some(ret) = &params.return_to_anchor {
                if return_step(particle, ret, viewport) {
                    params.visuals.returning_size.apply(&mut particle.size, rng);
                }
            }
        }
    }

    if let Some(scale) = params.ambient {
        particle.position += particle.velocity * scale;
    }

    if params.boundary == Boundary::Wrap {
        wrap(particle, viewport, rng);
    }

    if !particle.position.is_finite() {
        warn!(
            x = particle.position.x,
            y = particle.position.y,
            "rejected non-finite particle update"
        );
        particle.position = previous;
    }
    if !particle.size.is_finite() {
        particle.size = 0.0;
    }
    regime
}

/// Caches the pointer distance on the particle and picks the regime.
fn classify(particle: &mut Particle, pointer: &PointerState, params: &ForceParams) -> Regime {
    particle.distance = pointer.distance_to(particle.position);
    let Some(d) = particle.distance else {
        return Regime::Away;
    };
    if params.proximity == Proximity::None {
        return Regime::Away;
    }
    let radius = pointer.radius();
    let pad = if params.pad_with_size {
        particle.size
    } else {
        0.0
    };
    if d < radius + pad - params.inner_band {
        Regime::Proximity
    } else if params.inner_band > 0.0 && d < radius {
        Regime::Hover
    } else {
        Regime::Away
    }
}

fn apply_proximity(
    particle: &mut Particle,
    pointer: &PointerState,
    viewport: &Viewport,
    proximity: &Proximity,
) {
    let Some(mouse) = pointer.position() else {
        return;
    };
    match *proximity {
        Proximity::None | Proximity::Inflate => {}
        Proximity::Repel {
            strength,
            scale_by_radius,
        } => {
            let radius = pointer.radius();
            let offset = mouse - particle.position;
            let distance = offset.length();
            // Direction is undefined on top of the pointer.
            if distance == 0.0 || radius <= 0.0 {
                return;
            }
            let direction = offset / distance;
            let force = (radius - distance) / radius;
            let mut push = direction * force * particle.density * strength;
            if scale_by_radius {
                push *= radius;
            }
            particle.position -= push;
        }
        Proximity::Sidestep { step, edge_guard } => {
            let guard = particle.size * edge_guard;
            let p = &mut particle.position;
            if mouse.x < p.x && p.x < viewport.width() - guard {
                p.x += step;
            }
            if mouse.x > p.x && p.x > guard {
                p.x -= step;
            }
            if mouse.y < p.y && p.y < viewport.height() - guard {
                p.y += step;
            }
            if mouse.y > p.y && p.y > guard {
                p.y -= step;
            }
        }
    }
}

/// Eases toward the anchor; returns whether the particle moved.
fn return_step(particle: &mut Particle, ret: &ReturnParams, viewport: &Viewport) -> bool {
    let Some(anchor) = particle.anchor else {
        return false;
    };
    let mut moved = false;
    let p = &mut particle.position;
    if p.x != anchor.x {
        p.x -= (p.x - anchor.x) * ret.decay;
        moved = true;
    }
    if p.y != anchor.y {
        let target = match ret.target {
            ReturnTarget::Anchor => anchor.y,
            ReturnTarget::Ground => viewport.height(),
        };
        p.y -= (p.y - target) * ret.decay;
        moved = true;
    }
    moved
}

fn apply_field_drift(particle: &mut Particle, drift: &FieldDrift, grid: Option<&FieldGrid>) {
    let cell = grid.and_then(|g| g.get(particle.position.x, particle.position.y));
    // Off-grid frames keep the last sample.
    if let Some(cell) = cell {
        particle.speed = cell.brightness;
        particle.field_color = Some(cell.color);
    }
    let movement = drift.max_brightness - particle.speed + particle.drift;
    particle.angle += particle.speed * drift.angle_rate;
    if let Some(k) = drift.size_from_speed {
        particle.size = particle.speed * k;
    }
    particle.position += DVec2::new(
        movement * drift.x_factor + particle.angle.cos() * drift.wiggle,
        movement * drift.y_factor + particle.angle.sin() * drift.wiggle,
    );
}

fn bounce(particle: &mut Particle, viewport: &Viewport) {
    let p = particle.position;
    if p.x > viewport.width() || p.x < 0.0 {
        particle.velocity.x = -particle.velocity.x;
    }
    if p.y > viewport.height() || p.y < 0.0 {
        particle.velocity.y = -particle.velocity.y;
    }
}

fn wrap(particle: &mut Particle, viewport: &Viewport, rng: &mut Xorshift64) {
    let p = &mut particle.position;
    if p.y >= viewport.height() {
        p.y = 0.0;
        p.x = rng.next_range(0.0, viewport.width());
    }
    if p.x >= viewport.width() {
        p.x = 0.0;
        p.y = rng.next_range(0.0, viewport.height());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb8;
    use crate::field::FieldCell;

    fn viewport() -> Viewport {
        Viewport::new(400.0, 300.0).unwrap()
    }

    fn pointer_at(x: f64, y: f64, radius: f64) -> PointerState {
        let mut p = PointerState::new(radius);
        p.move_to(x, y);
        p
    }

    fn repel(strength: f64) -> ForceParams {
        ForceParams {
            proximity: Proximity::Repel {
                strength,
                scale_by_radius: false,
            },
            ..ForceParams::default()
        }
    }

    fn step(p: &mut Particle, pointer: &PointerState, params: &ForceParams) -> Regime {
        let mut rng = Xorshift64::new(1);
        update_particle(p, pointer, None, &viewport(), params, &mut rng)
    }

    #[test]
    fn repulsion_pushes_directly_away_from_pointer() {
        let mut p = Particle::anchored(DVec2::new(100.0, 100.0));
        p.density = 10.0;
        let pointer = pointer_at(150.0, 100.0, 100.0);
        let regime = step(&mut p, &pointer, &repel(1.0));
        assert_eq!(regime, Regime::Proximity);
        // force = (100 - 50) / 100 = 0.5; push = 0.5 * 10 = 5 to the left.
        assert!((p.position.x - 95.0).abs() < 1e-12);
        assert_eq!(p.position.y, 100.0);
        assert_eq!(p.distance, Some(50.0));
    }

    #[test]
    fn eraser_scales_push_by_radius() {
        let mut p = Particle::anchored(DVec2::new(100.0, 100.0));
        p.density = 1.0;
        let pointer = pointer_at(110.0, 100.0, 20.0);
        let params = ForceParams {
            proximity: Proximity::Repel {
                strength: 1.0,
                scale_by_radius: true,
            },
            ..ForceParams::default()
        };
        step(&mut p, &pointer, &params);
        // force = 0.5, push = 0.5 * 20 = 10.
        assert!((p.position.x - 90.0).abs() < 1e-12);
    }

    #[test]
    fn zero_distance_is_a_no_op_not_nan() {
        let mut p = Particle::anchored(DVec2::new(50.0, 50.0));
        p.density = 25.0;
        let pointer = pointer_at(50.0, 50.0, 100.0);
        let regime = step(&mut p, &pointer, &repel(1.0));
        assert_eq!(regime, Regime::Proximity);
        assert_eq!(p.position, DVec2::new(50.0, 50.0));
        assert_eq!(p.distance, Some(0.0));
    }

    #[test]
    fn absent_pointer_means_no_force() {
        let mut p = Particle::anchored(DVec2::new(10.0, 10.0));
        let pointer = PointerState::new(100.0);
        let regime = step(&mut p, &pointer, &repel(1.0));
        assert_eq!(regime, Regime::Away);
        assert_eq!(p.position, DVec2::new(10.0, 10.0));
        assert!(p.distance.is_none());
    }

    #[test]
    fn zero_radius_never_produces_nan() {
        let mut p = Particle::anchored(DVec2::new(10.0, 10.0));
        p.size = 3.0;
        let pointer = pointer_at(11.0, 10.0, 0.0);
        let params = ForceParams {
            pad_with_size: true,
            ..repel(1.0)
        };
        assert_eq!(step(&mut p, &pointer, &params), Regime::Proximity);
        assert!(p.is_finite());
    }

    #[test]
    fn padding_with_size_extends_trigger() {
        let mut p = Particle::anchored(DVec2::new(0.0, 0.0));
        p.size = 3.0;
        let pointer = pointer_at(102.0, 0.0, 100.0);
        assert_eq!(step(&mut p.clone(), &pointer, &repel(0.6)), Regime::Away);
        let padded = ForceParams {
            pad_with_size: true,
            ..repel(0.6)
        };
        assert_eq!(step(&mut p, &pointer, &padded), Regime::Proximity);
    }

    #[test]
    fn return_is_a_monotone_contraction_without_overshoot() {
        let anchor = DVec2::new(200.0, 150.0);
        let mut p = Particle::anchored(anchor);
        p.position = DVec2::new(260.0, 110.0);
        let pointer = PointerState::new(100.0);
        let params = ForceParams {
            return_to_anchor: Some(ReturnParams {
                decay: 1.0 / 20.0,
                target: ReturnTarget::Anchor,
            }),
            ..ForceParams::default()
        };
        let mut last = p.anchor_offset();
        for _ in 0..2000 {
            step(&mut p, &pointer, &params);
            let now = p.anchor_offset();
            if last > 1e-9 {
                assert!(now < last, "offset grew from {last} to {now}");
            }
            assert!(p.position.x >= anchor.x, "x overshot the anchor");
            assert!(p.position.y <= anchor.y, "y overshot the anchor");
            last = now;
        }
        assert!(last < 1e-9);
    }

    #[test]
    fn ground_target_drops_particles_to_bottom_edge() {
        let mut p = Particle::anchored(DVec2::new(100.0, 100.0));
        p.position = DVec2::new(120.0, 90.0);
        let params = ForceParams {
            return_to_anchor: Some(ReturnParams {
                decay: 0.1,
                target: ReturnTarget::Ground,
            }),
            ..ForceParams::default()
        };
        let pointer = PointerState::new(42.0);
        for _ in 0..400 {
            step(&mut p, &pointer, &params);
        }
        assert!((p.position.x - 100.0).abs() < 1e-6);
        assert!((p.position.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn visuals_follow_regimes() {
        let params = ForceParams {
            visuals: Visuals {
                active_size: SizeRule::Fixed(10.0),
                idle_size: SizeRule::Fixed(4.0),
                reveal: ColorReveal::WhileNear,
                ..Visuals::default()
            },
            ..repel(1.0)
        };
        let mut p = Particle::anchored(DVec2::new(100.0, 100.0));
        step(&mut p, &pointer_at(110.0, 100.0, 50.0), &params);
        assert_eq!(p.size, 10.0);
        assert!(p.active);
        step(&mut p, &pointer_at(390.0, 290.0, 50.0), &params);
        assert_eq!(p.size, 4.0);
        assert!(!p.active);
    }

    #[test]
    fn sticky_reveal_survives_leaving_the_radius() {
        let params = ForceParams {
            visuals: Visuals {
                reveal: ColorReveal::Sticky,
                ..Visuals::default()
            },
            ..repel(1.0)
        };
        let mut p = Particle::anchored(DVec2::new(100.0, 100.0));
        step(&mut p, &pointer_at(105.0, 100.0, 50.0), &params);
        assert!(p.active);
        let mut absent = PointerState::new(50.0);
        absent.leave();
        step(&mut p, &absent, &params);
        assert!(p.active);
    }

    #[test]
    fn returning_size_only_while_moving_back() {
        let params = ForceParams {
            visuals: Visuals {
                idle_size: SizeRule::Fixed(3.0),
                returning_size: SizeRule::Fixed(0.0),
                ..Visuals::default()
            },
            ..repel(1.0)
        };
        let pointer = PointerState::new(10.0);
        let mut resting = Particle::anchored(DVec2::new(5.0, 5.0));
        step(&mut resting, &pointer, &params);
        assert_eq!(resting.size, 3.0);
        let mut displaced = Particle::anchored(DVec2::new(5.0, 5.0));
        displaced.position.x = 9.0;
        step(&mut displaced, &pointer, &params);
        assert_eq!(displaced.size, 0.0);
    }

    #[test]
    fn hover_band_changes_size_without_pushing() {
        let params = ForceParams {
            inner_band: 5.0,
            visuals: Visuals {
                active_size: SizeRule::Fixed(7.0),
                hover_size: SizeRule::Fixed(6.0),
                ..Visuals::default()
            },
            ..repel(1.0)
        };
        let mut p = Particle::anchored(DVec2::new(100.0, 100.0));
        let regime = step(&mut p, &pointer_at(139.0, 100.0, 42.0), &params);
        assert_eq!(regime, Regime::Hover);
        assert_eq!(p.size, 6.0);
        assert_eq!(p.position, DVec2::new(100.0, 100.0));
        let regime = step(&mut p, &pointer_at(120.0, 100.0, 42.0), &params);
        assert_eq!(regime, Regime::Proximity);
        assert_eq!(p.size, 7.0);
        assert!(p.position.x < 100.0);
    }

    #[test]
    fn inflate_changes_size_only() {
        let params = ForceParams {
            proximity: Proximity::Inflate,
            return_to_anchor: None,
            visuals: Visuals {
                active_size: SizeRule::Fixed(8.0),
                idle_size: SizeRule::Fixed(3.0),
                ..Visuals::default()
            },
            ..ForceParams::default()
        };
        let mut p = Particle::at(DVec2::new(10.0, 10.0));
        step(&mut p, &pointer_at(20.0, 10.0, 100.0), &params);
        assert_eq!(p.size, 8.0);
        assert_eq!(p.position, DVec2::new(10.0, 10.0));
    }

    #[test]
    fn sidestep_moves_away_on_both_axes() {
        let params = ForceParams {
            proximity: Proximity::Sidestep {
                step: 10.0,
                edge_guard: 10.0,
            },
            pad_with_size: true,
            return_to_anchor: None,
            ..ForceParams::default()
        };
        let mut p = Particle::at(DVec2::new(200.0, 150.0));
        p.size = 2.0;
        step(&mut p, &pointer_at(190.0, 160.0, 50.0), &params);
        assert_eq!(p.position, DVec2::new(210.0, 140.0));
    }

    #[test]
    fn sidestep_respects_edge_guard() {
        let params = ForceParams {
            proximity: Proximity::Sidestep {
                step: 10.0,
                edge_guard: 10.0,
            },
            return_to_anchor: None,
            ..ForceParams::default()
        };
        let mut p = Particle::at(DVec2::new(385.0, 150.0));
        p.size = 2.0;
        step(&mut p, &pointer_at(380.0, 150.0, 50.0), &params);
        assert_eq!(p.position.x, 385.0);
    }

    #[test]
    fn bounce_inverts_velocity_and_ambient_moves() {
        let params = ForceParams {
            proximity: Proximity::None,
            ambient: Some(0.5),
            boundary: Boundary::Bounce,
            return_to_anchor: None,
            ..ForceParams::default()
        };
        let mut p = Particle::at(DVec2::new(401.0, 100.0));
        p.velocity = DVec2::new(2.0, 1.0);
        step(&mut p, &PointerState::new(10.0), &params);
        assert_eq!(p.velocity, DVec2::new(-2.0, 1.0));
        assert_eq!(p.position, DVec2::new(400.0, 100.5));
    }

    fn uniform_grid(brightness: f64, color: Rgb8) -> FieldGrid {
        FieldGrid::from_cells(400, 300, vec![FieldCell { brightness, color }; 400 * 300])
            .unwrap()
    }

    fn rain() -> ForceParams {
        ForceParams {
            proximity: Proximity::None,
            field_drift: Some(FieldDrift::default()),
            return_to_anchor: None,
            boundary: Boundary::Wrap,
            ..ForceParams::default()
        }
    }

    #[test]
    fn dark_regions_move_faster() {
        let mut rng = Xorshift64::new(2);
        let pointer = PointerState::new(100.0);
        let dark = uniform_grid(0.0, Rgb8::BLACK);
        let bright = uniform_grid(2.55, Rgb8::WHITE);

        let mut a = Particle::at(DVec2::new(10.0, 10.0));
        update_particle(&mut a, &pointer, Some(&dark), &viewport(), &rain(), &mut rng);
        let mut b = Particle::at(DVec2::new(10.0, 10.0));
        update_particle(&mut b, &pointer, Some(&bright), &viewport(), &rain(), &mut rng);

        assert!((a.position.x - 12.55).abs() < 1e-9);
        assert!((a.position.y - (10.0 + 2.55 / 3.0)).abs() < 1e-9);
        assert!((b.position.x - 10.0).abs() < 1e-9);
        assert_eq!(a.field_color, Some(Rgb8::BLACK));
        assert_eq!(b.field_color, Some(Rgb8::WHITE));
    }

    #[test]
    fn off_grid_lookup_keeps_cached_sample() {
        let mut rng = Xorshift64::new(2);
        let grid = FieldGrid::from_cells(
            4,
            4,
            vec![
                FieldCell {
                    brightness: 1.0,
                    color: Rgb8::new(1, 2, 3)
                };
                16
            ],
        )
        .unwrap();
        let mut p = Particle::at(DVec2::new(1.0, 1.0));
        let pointer = PointerState::new(100.0);
        update_particle(&mut p, &pointer, Some(&grid), &viewport(), &rain(), &mut rng);
        assert_eq!(p.speed, 1.0);
        // Now well outside the 4x4 grid but inside the viewport.
        p.position = DVec2::new(100.0, 100.0);
        update_particle(&mut p, &pointer, Some(&grid), &viewport(), &rain(), &mut rng);
        assert_eq!(p.speed, 1.0);
        assert_eq!(p.field_color, Some(Rgb8::new(1, 2, 3)));
    }

    #[test]
    fn wrap_reenters_from_the_opposite_edge() {
        let mut rng = Xorshift64::new(4);
        let pointer = PointerState::new(100.0);
        let grid = uniform_grid(0.0, Rgb8::BLACK);
        let mut p = Particle::at(DVec2::new(100.0, 299.5));
        update_particle(&mut p, &pointer, Some(&grid), &viewport(), &rain(), &mut rng);
        assert_eq!(p.position.y, 0.0);
        assert!((0.0..400.0).contains(&p.position.x));

        let mut q = Particle::at(DVec2::new(399.0, 10.0));
        update_particle(&mut q, &pointer, Some(&grid), &viewport(), &rain(), &mut rng);
        assert_eq!(q.position.x, 0.0);
        assert!((0.0..300.0).contains(&q.position.y));
    }

    #[test]
    fn wiggle_and_speed_sizing() {
        let mut rng = Xorshift64::new(4);
        let params = ForceParams {
            field_drift: Some(FieldDrift {
                y_factor: 1.0,
                wiggle: 3.0,
                angle_rate: 1.0 / 20.0,
                size_from_speed: Some(1.5),
                ..FieldDrift::default()
            }),
            ..rain()
        };
        let grid = uniform_grid(2.0, Rgb8::WHITE);
        let mut p = Particle::at(DVec2::new(50.0, 50.0));
        update_particle(&mut p, &PointerState::new(1.0), Some(&grid), &viewport(), &params, &mut rng);
        let angle = 2.0_f64 / 20.0;
        assert!((p.angle - angle).abs() < 1e-12);
        assert!((p.size - 3.0).abs() < 1e-12);
        let movement = 2.55 - 2.0;
        assert!((p.position.x - (50.0 + movement + angle.cos() * 3.0)).abs() < 1e-9);
        assert!((p.position.y - (50.0 + movement + angle.sin() * 3.0)).abs() < 1e-9);
    }

    #[test]
    fn field_drift_and_repulsion_compose_additively() {
        let mut rng = Xorshift64::new(4);
        let grid = uniform_grid(2.55, Rgb8::WHITE);
        let params = ForceParams {
            proximity: Proximity::Repel {
                strength: 1.0,
                scale_by_radius: false,
            },
            field_drift: Some(FieldDrift::default()),
            ..rain()
        };
        let mut p = Particle::at(DVec2::new(100.0, 100.0));
        p.drift = 0.3;
        p.density = 10.0;
        // Drift moves to (100.3, 100.1); pointer 50px to the right of that.
        let pointer = pointer_at(150.3, 100.1, 100.0);
        update_particle(&mut p, &pointer, Some(&grid), &viewport(), &params, &mut rng);
        assert!((p.position.x - (100.3 - 5.0)).abs() < 1e-9);
        assert!((p.position.y - 100.1).abs() < 1e-9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn positions_stay_finite(
                px in -500.0_f64..900.0,
                py in -500.0_f64..800.0,
                mx in -500.0_f64..900.0,
                my in -500.0_f64..800.0,
                radius in 0.0_f64..300.0,
                density in 1.0_f64..31.0,
                on_top in any::<bool>(),
                frames in 1_usize..60,
            ) {
                let mut p = Particle::anchored(DVec2::new(px, py));
                p.density = density;
                let pointer = if on_top {
                    pointer_at(px, py, radius)
                } else {
                    pointer_at(mx, my, radius)
                };
                let params = ForceParams {
                    proximity: Proximity::Repel { strength: 1.0, scale_by_radius: true },
                    pad_with_size: true,
                    ..ForceParams::default()
                };
                let mut rng = Xorshift64::new(7);
                for _ in 0..frames {
                    update_particle(&mut p, &pointer, None, &viewport(), &params, &mut rng);
                    prop_assert!(p.is_finite());
                }
            }

            #[test]
            fn return_never_overshoots(
                ox in -300.0_f64..300.0,
                oy in -300.0_f64..300.0,
                decay in 0.01_f64..0.99,
            ) {
                let anchor = DVec2::new(200.0, 150.0);
                let mut p = Particle::anchored(anchor);
                p.position = anchor + DVec2::new(ox, oy);
                let params = ForceParams {
                    return_to_anchor: Some(ReturnParams { decay, target: ReturnTarget::Anchor }),
                    ..ForceParams::default()
                };
                let pointer = PointerState::new(10.0);
                let mut rng = Xorshift64::new(1);
                let mut last = p.anchor_offset();
                for _ in 0..50 {
                    update_particle(&mut p, &pointer, None, &viewport(), &params, &mut rng);
                    let d = p.position - anchor;
                    prop_assert!(d.x * ox >= 0.0 && d.y * oy >= 0.0);
                    prop_assert!(p.anchor_offset() <= last);
                    last = p.anchor_offset();
                }
            }
        }
    }
}
