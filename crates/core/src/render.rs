//! Renderer: draws particles and connection lines onto a [`DrawContext`].
//!
//! Everything here is a free function over particle slices so the force
//! model never needs a drawing surface and the renderer never mutates a
//! particle.

use std::borrow::Cow;
use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::canvas::Viewport;
use crate::color::{Rgb8, Rgba};
use crate::particle::Particle;
use crate::surface::{DrawContext, Paint, Rect};

/// Per-frame surface preparation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Background {
    /// Erase the whole surface.
    #[default]
    Clear,
    /// Overlay a translucent fill so previous frames fade into trails.
    TrailFade { color: Rgb8, opacity: f64 },
}

/// Highlight placement inside a bubble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// Fill the whole disk.
    #[default]
    Disk,
    /// One or two small reflection spots near the top left.
    Spots,
}

/// Stroked ring with a translucent highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleStyle {
    pub ring: Paint,
    pub line_width: f64,
    pub highlight: Rgba,
    pub highlight_mode: Highlight,
    /// Radii for the inner band, the rim and outside the pointer radius.
    /// `None` draws at the particle's own size.
    pub tier_sizes: Option<[f64; 3]>,
    /// Width of the rim band inside the pointer radius.
    pub band: f64,
}

/// Particle outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Shape {
    Circle,
    Bubble(BubbleStyle),
    Glyph { glyphs: Vec<String>, font_px: f64 },
    /// Stroked square of side `size * scale` anchored at the particle.
    RectOutline { scale: f64, line_width: f64 },
}

/// Color source for a particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Fill {
    /// Full color once active, idle color otherwise.
    Particle,
    /// Last sampled field color, falling back to the particle color.
    Field,
    Fixed(Paint),
}

/// Alpha source for a particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Opacity {
    Opaque,
    Fixed(f64),
    /// `speed * factor`: brighter field regions draw more opaque.
    FromSpeed(f64),
    /// The particle's own opacity attribute.
    Particle,
}

/// Connection line threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MaxDistance {
    Fixed(f64),
    /// `(width / d) * (height / d)`.
    ViewportScaled(f64),
}

impl MaxDistance {
    pub fn resolve(&self, viewport: &Viewport) -> f64 {
        match *self {
            MaxDistance::Fixed(d) => d,
            MaxDistance::ViewportScaled(divisor) => viewport.scaled_length(divisor),
        }
    }
}

/// Color used for pairs closer than `below`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InnerColor {
    pub below: f64,
    pub color: Rgb8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub max: MaxDistance,
    pub color: Rgb8,
    pub inner: Option<InnerColor>,
    pub line_width: f64,
    /// Use the bucketed pass instead of checking every pair.
    #[serde(default)]
    pub bucketed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub background: Background,
    pub shape: Shape,
    pub fill: Fill,
    pub opacity: Opacity,
    pub connections: Option<ConnectionParams>,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            background: Background::Clear,
            shape: Shape::Circle,
            fill: Fill::Particle,
            opacity: Opacity::Opaque,
            connections: None,
        }
    }
}

/// A line between particles `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub opacity: f64,
    pub color: Rgb8,
}

/// Clears or fades the whole surface.
pub fn begin_frame(ctx: &mut dyn DrawContext, background: &Background) {
    let full = Rect::covering(ctx.size());
    match *background {
        Background::Clear => ctx.clear_rect(full),
        Background::TrailFade { color, opacity } => {
            ctx.fill_rect(full, &Paint::Solid(color), opacity)
        }
    }
}

fn particle_alpha(p: &Particle, opacity: &Opacity) -> f64 {
    let a = match *opacity {
        Opacity::Opaque => 1.0,
        Opacity::Fixed(a) => a,
        Opacity::FromSpeed(k) => p.speed * k,
        Opacity::Particle => p.opacity,
    };
    if a.is_finite() {
        a.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn particle_paint<'a>(p: &Particle, fill: &'a Fill) -> Cow<'a, Paint> {
    match fill {
        Fill::Particle => {
            let c = if p.active { p.color } else { p.idle_color };
            Cow::Owned(Paint::Solid(c))
        }
        Fill::Field => Cow::Owned(Paint::Solid(p.field_color.unwrap_or(p.color))),
        Fill::Fixed(paint) => Cow::Borrowed(paint),
    }
}

/// Draws one particle in its current visual state.
///
/// `pointer_radius` selects the bubble size tier.
pub fn draw_particle(
    ctx: &mut dyn DrawContext,
    p: &Particle,
    params: &RenderParams,
    pointer_radius: f64,
) {
    if !p.is_finite() {
        return;
    }
    let alpha = particle_alpha(p, &params.opacity);
    let paint = particle_paint(p, &params.fill);
    match &params.shape {
        Shape::Circle => {
            if p.size > 0.0 {
                ctx.fill_arc(p.position, p.size, &paint, alpha);
            }
        }
        Shape::Bubble(style) => draw_bubble(ctx, p, style, pointer_radius),
        Shape::Glyph { glyphs, font_px } => {
            if glyphs.is_empty() {
                return;
            }
            let text = &glyphs[p.glyph % glyphs.len()];
            ctx.fill_text(text, p.position, *font_px, &paint, alpha);
        }
        Shape::RectOutline { scale, line_width } => {
            let side = p.size * scale;
            if side > 0.0 {
                let rect = Rect::new(p.position.x, p.position.y, side, side);
                ctx.stroke_rect(rect, &paint, *line_width, alpha);
            }
        }
    }
}

fn draw_bubble(ctx: &mut dyn DrawContext, p: &Particle, style: &BubbleStyle, radius: f64) {
    // 0: inside the inner band, 1: on the rim, 2: outside or no pointer.
    let tier = match p.distance {
        Some(d) if d < radius - style.band => 0,
        Some(d) if d <= radius => 1,
        _ => 2,
    };
    let size = style.tier_sizes.map_or(p.size, |sizes| sizes[tier]);
    if size <= 0.0 {
        return;
    }
    let c = p.position;
    let highlight = Paint::Solid(style.highlight.rgb);
    let a = style.highlight.alpha;
    ctx.stroke_arc(c, size, &style.ring, style.line_width, 1.0);
    match style.highlight_mode {
        Highlight::Disk => ctx.fill_arc(c, size, &highlight, a),
        Highlight::Spots if tier == 0 => {
            ctx.fill_arc(c + DVec2::new(-3.0, -3.0), size / 2.5, &highlight, a);
            ctx.fill_arc(c + DVec2::new(3.0, -1.0), size / 3.5, &highlight, a);
        }
        Highlight::Spots => ctx.fill_arc(c + DVec2::new(-1.0, -1.0), size / 3.0, &highlight, a),
    }
}

fn connection(
    particles: &[Particle],
    a: usize,
    b: usize,
    max: f64,
    params: &ConnectionParams,
) -> Option<Connection> {
    let distance = particles[a].position.distance(particles[b].position);
    if !(distance < max) {
        return None;
    }
    let color = match params.inner {
        Some(inner) if distance < inner.below => inner.color,
        _ => params.color,
    };
    Some(Connection {
        a,
        b,
        distance,
        opacity: 1.0 - distance / max,
        color,
    })
}

/// Every pair `a < b` closer than the threshold, in population order.
pub fn connections(
    particles: &[Particle],
    params: &ConnectionParams,
    viewport: &Viewport,
) -> Vec<Connection> {
    let max = params.max.resolve(viewport);
    let mut out = Vec::new();
    if !(max > 0.0) {
        return out;
    }
    for a in 0..particles.len() {
        for b in a + 1..particles.len() {
            if let Some(c) = connection(particles, a, b, max, params) {
                out.push(c);
            }
        }
    }
    out
}

/// Same result as [`connections`], restricting candidates to neighboring
/// grid cells of side `max`.
pub fn connections_bucketed(
    particles: &[Particle],
    params: &ConnectionParams,
    viewport: &Viewport,
) -> Vec<Connection> {
    let max = params.max.resolve(viewport);
    let mut out = Vec::new();
    if !(max > 0.0) {
        return out;
    }
    let cell_of = |p: DVec2| ((p.x / max).floor() as i64, (p.y / max).floor() as i64);

    let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in particles.iter().enumerate() {
        if p.is_finite() {
            buckets.entry(cell_of(p.position)).or_default().push(i);
        }
    }

    let mut candidates = Vec::new();
    for a in 0..particles.len() {
        if !particles[a].is_finite() {
            continue;
        }
        let (cx, cy) = cell_of(particles[a].position);
        candidates.clear();
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(bucket) = buckets.get(&key) {
                    candidates.extend(bucket.iter().copied().filter(|&b| b > a));
                }
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        for &b in &candidates {
            if let Some(c) = connection(particles, a, b, max, params) {
                out.push(c);
            }
        }
    }
    out
}

pub fn draw_connections(
    ctx: &mut dyn DrawContext,
    particles: &[Particle],
    lines: &[Connection],
    line_width: f64,
) {
    for c in lines {
        ctx.line(
            particles[c.a].position,
            particles[c.b].position,
            c.color.with_alpha(c.opacity),
            line_width,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingContext};

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 1000.0).unwrap()
    }

    fn fixed(max: f64) -> ConnectionParams {
        ConnectionParams {
            max: MaxDistance::Fixed(max),
            color: Rgb8::new(90, 90, 90),
            inner: None,
            line_width: 1.0,
            bucketed: false,
        }
    }

    fn at(x: f64, y: f64) -> Particle {
        Particle::at(DVec2::new(x, y))
    }

    #[test]
    fn threshold_is_strict() {
        let ps = [at(0.0, 0.0), at(25.0, 0.0), at(0.0, 24.999)];
        let lines = connections(&ps, &fixed(25.0), &viewport());
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].a, lines[0].b), (0, 2));
    }

    #[test]
    fn coincident_particles_draw_fully_opaque() {
        let ps = [at(5.0, 5.0), at(5.0, 5.0)];
        let lines = connections(&ps, &fixed(25.0), &viewport());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].opacity, 1.0);
    }

    #[test]
    fn opacity_falls_off_linearly() {
        let ps = [at(0.0, 0.0), at(10.0, 0.0)];
        let lines = connections(&ps, &fixed(40.0), &viewport());
        assert!((lines[0].opacity - 0.75).abs() < 1e-12);
    }

    #[test]
    fn inner_color_switches_below_threshold() {
        let params = ConnectionParams {
            inner: Some(InnerColor {
                below: 15.0,
                color: Rgb8::new(0, 0, 119),
            }),
            color: Rgb8::new(190, 80, 119),
            ..fixed(25.0)
        };
        let ps = [at(0.0, 0.0), at(10.0, 0.0), at(30.0, 0.0)];
        let lines = connections(&ps, &params, &viewport());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].color, Rgb8::new(0, 0, 119));
        assert_eq!(lines[1].color, Rgb8::new(190, 80, 119));
    }

    #[test]
    fn no_self_pairs_and_pairs_in_population_order() {
        let ps = [at(0.0, 0.0), at(1.0, 0.0), at(2.0, 0.0)];
        let lines = connections(&ps, &fixed(10.0), &viewport());
        let pairs: Vec<_> = lines.iter().map(|c| (c.a, c.b)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn viewport_scaled_threshold() {
        let vp = Viewport::new(1000.0, 500.0).unwrap();
        assert_eq!(MaxDistance::ViewportScaled(100.0).resolve(&vp), 50.0);
        let params = ConnectionParams {
            max: MaxDistance::ViewportScaled(100.0),
            ..fixed(0.0)
        };
        let ps = [at(0.0, 0.0), at(49.0, 0.0), at(150.0, 0.0)];
        assert_eq!(connections(&ps, &params, &vp).len(), 1);
    }

    #[test]
    fn zero_threshold_draws_nothing() {
        let ps = [at(0.0, 0.0), at(0.0, 0.0)];
        assert!(connections(&ps, &fixed(0.0), &viewport()).is_empty());
        assert!(connections_bucketed(&ps, &fixed(0.0), &viewport()).is_empty());
    }

    #[test]
    fn draw_connections_emits_one_line_per_pair() {
        let ps = [at(0.0, 0.0), at(10.0, 0.0)];
        let lines = connections(&ps, &fixed(20.0), &viewport());
        let mut ctx = RecordingContext::new(100.0, 100.0);
        draw_connections(&mut ctx, &ps, &lines, 2.0);
        match &ctx.commands[..] {
            [DrawCommand::Line {
                from,
                to,
                color,
                width,
            }] => {
                assert_eq!(*from, DVec2::ZERO);
                assert_eq!(*to, DVec2::new(10.0, 0.0));
                assert!((color.alpha - 0.5).abs() < 1e-12);
                assert_eq!(*width, 2.0);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn trail_fade_overlays_translucent_fill() {
        let mut ctx = RecordingContext::new(40.0, 30.0);
        begin_frame(
            &mut ctx,
            &Background::TrailFade {
                color: Rgb8::BLACK,
                opacity: 0.05,
            },
        );
        assert_eq!(
            ctx.commands,
            vec![DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 40.0, 30.0),
                paint: Paint::Solid(Rgb8::BLACK),
                alpha: 0.05,
            }]
        );
        ctx.clear();
        begin_frame(&mut ctx, &Background::Clear);
        assert!(matches!(ctx.commands[0], DrawCommand::ClearRect(_)));
    }

    #[test]
    fn circle_uses_idle_color_until_active() {
        let mut p = at(3.0, 4.0);
        p.size = 2.0;
        p.color = Rgb8::new(200, 10, 10);
        p.idle_color = Rgb8::new(73, 73, 73);
        let params = RenderParams::default();
        let mut ctx = RecordingContext::new(10.0, 10.0);
        draw_particle(&mut ctx, &p, &params, 100.0);
        p.active = true;
        draw_particle(&mut ctx, &p, &params, 100.0);
        let paints: Vec<_> = ctx
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillArc { paint, radius, .. } => Some((paint.clone(), *radius)),
                _ => None,
            })
            .collect();
        assert_eq!(
            paints,
            vec![
                (Paint::Solid(Rgb8::new(73, 73, 73)), 2.0),
                (Paint::Solid(Rgb8::new(200, 10, 10)), 2.0),
            ]
        );
    }

    #[test]
    fn zero_size_circle_is_skipped() {
        let mut p = at(3.0, 4.0);
        p.size = 0.0;
        let mut ctx = RecordingContext::new(10.0, 10.0);
        draw_particle(&mut ctx, &p, &RenderParams::default(), 100.0);
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn speed_driven_opacity_and_field_fill() {
        let mut p = at(1.0, 1.0);
        p.speed = 1.2;
        p.field_color = Some(Rgb8::new(1, 2, 3));
        let params = RenderParams {
            fill: Fill::Field,
            opacity: Opacity::FromSpeed(0.5),
            ..RenderParams::default()
        };
        let mut ctx = RecordingContext::new(10.0, 10.0);
        draw_particle(&mut ctx, &p, &params, 0.0);
        match &ctx.commands[0] {
            DrawCommand::FillArc { paint, alpha, .. } => {
                assert_eq!(*paint, Paint::Solid(Rgb8::new(1, 2, 3)));
                assert!((alpha - 0.6).abs() < 1e-12);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn glyphs_cycle_by_index() {
        let mut p = at(1.0, 1.0);
        p.glyph = 5;
        let params = RenderParams {
            shape: Shape::Glyph {
                glyphs: ["J", "I", "N", "X"].map(String::from).to_vec(),
                font_px: 40.0,
            },
            ..RenderParams::default()
        };
        let mut ctx = RecordingContext::new(10.0, 10.0);
        draw_particle(&mut ctx, &p, &params, 0.0);
        assert!(matches!(
            &ctx.commands[0],
            DrawCommand::FillText { text, font_px, .. } if text == "I" && *font_px == 40.0
        ));
    }

    #[test]
    fn rect_outline_scales_with_size() {
        let mut p = at(2.0, 3.0);
        p.size = 1.5;
        let params = RenderParams {
            shape: Shape::RectOutline {
                scale: 5.0,
                line_width: 1.0,
            },
            ..RenderParams::default()
        };
        let mut ctx = RecordingContext::new(10.0, 10.0);
        draw_particle(&mut ctx, &p, &params, 0.0);
        assert!(matches!(
            ctx.commands[0],
            DrawCommand::StrokeRect { rect, .. } if rect == Rect::new(2.0, 3.0, 7.5, 7.5)
        ));
    }

    fn bubble(mode: Highlight, tiers: Option<[f64; 3]>) -> RenderParams {
        RenderParams {
            shape: Shape::Bubble(BubbleStyle {
                ring: Paint::Solid(Rgb8::new(34, 147, 214)),
                line_width: 3.0,
                highlight: Rgb8::new(255, 55, 255).with_alpha(0.8),
                highlight_mode: mode,
                tier_sizes: tiers,
                band: 5.0,
            }),
            ..RenderParams::default()
        }
    }

    fn ring_radius(ctx: &RecordingContext) -> f64 {
        ctx.commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::StrokeArc { radius, .. } => Some(*radius),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn bubble_tiers_follow_pointer_distance() {
        let params = bubble(Highlight::Disk, Some([13.0, 10.0, 8.0]));
        let mut p = at(50.0, 50.0);
        for (distance, expected) in [(Some(10.0), 13.0), (Some(148.0), 10.0), (Some(150.0), 10.0), (None, 8.0)] {
            p.distance = distance;
            let mut ctx = RecordingContext::new(100.0, 100.0);
            draw_particle(&mut ctx, &p, &params, 150.0);
            assert_eq!(ring_radius(&ctx), expected);
            assert_eq!(ctx.commands.len(), 2);
        }
    }

    #[test]
    fn bubble_spots_use_two_highlights_when_close() {
        let params = bubble(Highlight::Spots, None);
        let mut p = at(50.0, 50.0);
        p.size = 7.0;
        p.distance = Some(1.0);
        let mut ctx = RecordingContext::new(100.0, 100.0);
        draw_particle(&mut ctx, &p, &params, 42.0);
        assert_eq!(ctx.commands.len(), 3);
        assert_eq!(ring_radius(&ctx), 7.0);

        p.distance = Some(40.0);
        let mut ctx = RecordingContext::new(100.0, 100.0);
        draw_particle(&mut ctx, &p, &params, 42.0);
        assert_eq!(ctx.commands.len(), 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bucketed_pass_matches_brute_force(
                points in prop::collection::vec((0.0_f64..300.0, 0.0_f64..300.0), 0..80),
                max in 1.0_f64..80.0,
            ) {
                let ps: Vec<Particle> = points.iter().map(|&(x, y)| at(x, y)).collect();
                let params = fixed(max);
                let brute = connections(&ps, &params, &viewport());
                let bucketed = connections_bucketed(&ps, &params, &viewport());
                prop_assert_eq!(brute, bucketed);
            }

            #[test]
            fn every_connection_is_within_threshold(
                points in prop::collection::vec((0.0_f64..100.0, 0.0_f64..100.0), 0..40),
                max in 1.0_f64..50.0,
            ) {
                let ps: Vec<Particle> = points.iter().map(|&(x, y)| at(x, y)).collect();
                for c in connections(&ps, &fixed(max), &viewport()) {
                    prop_assert!(c.a < c.b);
                    prop_assert!(c.distance < max);
                    prop_assert!(c.opacity > 0.0 && c.opacity <= 1.0);
                }
            }
        }
    }
}
