//! Drawing surface abstraction.
//!
//! The renderer issues a small set of 2D primitives against [`DrawContext`].
//! Hosts implement it over whatever they display on; the engines crate ships
//! a software pixel canvas, and [`RecordingContext`] here captures the calls
//! for tests.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::{Rgb8, Rgba};
use crate::error::EngineError;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole surface of the given size.
    pub fn covering(size: DVec2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }
}

/// A color stop at `offset` in [0, 1] along the gradient axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgb8,
}

/// Direction of a gradient across the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientAxis {
    /// Top-left to bottom-right corner.
    #[default]
    Diagonal,
    Horizontal,
    Vertical,
}

/// Linear gradient spanning the surface, sampled with canvas semantics:
/// positions are projected onto the axis, and anything before the first or
/// after the last stop takes that stop's color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradientSpec")]
pub struct LinearGradient {
    pub axis: GradientAxis,
    stops: Vec<ColorStop>,
}

/// Unchecked wire form; deserialization goes through [`LinearGradient::new`].
#[derive(Deserialize)]
struct GradientSpec {
    #[serde(default)]
    axis: GradientAxis,
    stops: Vec<ColorStop>,
}

impl TryFrom<GradientSpec> for LinearGradient {
    type Error = EngineError;

    fn try_from(spec: GradientSpec) -> Result<Self, Self::Error> {
        LinearGradient::new(spec.axis, spec.stops)
    }
}

impl LinearGradient {
    /// Stops must be non-empty with offsets in [0, 1]; they are sorted by offset.
    pub fn new(axis: GradientAxis, mut stops: Vec<ColorStop>) -> Result<Self, EngineError> {
        if stops.is_empty() {
            return Err(EngineError::invalid_param(
                "gradient",
                "at least one color stop is required",
            ));
        }
        if let Some(bad) = stops
            .iter()
            .find(|s| !(s.offset.is_finite() && (0.0..=1.0).contains(&s.offset)))
        {
            return Err(EngineError::invalid_param(
                "gradient",
                format!("stop offset {} outside [0, 1]", bad.offset),
            ));
        }
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Ok(Self { axis, stops })
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Position along the axis in [0, 1] for `p` on a surface of `extent`.
    fn project(&self, p: DVec2, extent: DVec2) -> f64 {
        let end = match self.axis {
            GradientAxis::Diagonal => extent,
            GradientAxis::Horizontal => DVec2::new(extent.x, 0.0),
            GradientAxis::Vertical => DVec2::new(0.0, extent.y),
        };
        let len2 = end.length_squared();
        if len2 <= 0.0 || !len2.is_finite() {
            return 0.0;
        }
        (p.dot(end) / len2).clamp(0.0, 1.0)
    }

    pub fn color_at(&self, p: DVec2, extent: DVec2) -> Rgb8 {
        let t = self.project(p, extent);
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Rgb8::BLACK,
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.offset && t <= b.offset {
                let span = b.offset - a.offset;
                if span <= 0.0 {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.offset) / span);
            }
        }
        last.color
    }
}

/// Fill or stroke source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Paint {
    Solid(Rgb8),
    Gradient(LinearGradient),
}

impl Paint {
    /// Color of this paint at `p` on a surface of `extent`.
    pub fn color_at(&self, p: DVec2, extent: DVec2) -> Rgb8 {
        match self {
            Paint::Solid(c) => *c,
            Paint::Gradient(g) => g.color_at(p, extent),
        }
    }
}

impl From<Rgb8> for Paint {
    fn from(c: Rgb8) -> Self {
        Paint::Solid(c)
    }
}

/// 2D drawing primitives used by the renderer.
///
/// `alpha` arguments are in [0, 1] and composite over existing content.
pub trait DrawContext {
    /// Surface size in pixels.
    fn size(&self) -> DVec2;

    /// Resets a rectangle to transparent.
    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint, alpha: f64);

    fn stroke_rect(&mut self, rect: Rect, paint: &Paint, width: f64, alpha: f64);

    fn fill_arc(&mut self, center: DVec2, radius: f64, paint: &Paint, alpha: f64);

    fn stroke_arc(&mut self, center: DVec2, radius: f64, paint: &Paint, width: f64, alpha: f64);

    fn line(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f64);

    /// Draws `text` with its baseline-left corner at `at`.
    fn fill_text(&mut self, text: &str, at: DVec2, font_px: f64, paint: &Paint, alpha: f64);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect(Rect),
    FillRect {
        rect: Rect,
        paint: Paint,
        alpha: f64,
    },
    StrokeRect {
        rect: Rect,
        paint: Paint,
        width: f64,
        alpha: f64,
    },
    FillArc {
        center: DVec2,
        radius: f64,
        paint: Paint,
        alpha: f64,
    },
    StrokeArc {
        center: DVec2,
        radius: f64,
        paint: Paint,
        width: f64,
        alpha: f64,
    },
    Line {
        from: DVec2,
        to: DVec2,
        color: Rgba,
        width: f64,
    },
    FillText {
        text: String,
        at: DVec2,
        font_px: f64,
        paint: Paint,
        alpha: f64,
    },
}

/// A [`DrawContext`] that records every call instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    size: DVec2,
    pub commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: DVec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }
}

impl DrawContext for RecordingContext {
    fn size(&self) -> DVec2 {
        self.size
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClearRect(rect));
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint, alpha: f64) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            paint: paint.clone(),
            alpha,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, paint: &Paint, width: f64, alpha: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            paint: paint.clone(),
            width,
            alpha,
        });
    }

    fn fill_arc(&mut self, center: DVec2, radius: f64, paint: &Paint, alpha: f64) {
        self.commands.push(DrawCommand::FillArc {
            center,
            radius,
            paint: paint.clone(),
            alpha,
        });
    }

    fn stroke_arc(&mut self, center: DVec2, radius: f64, paint: &Paint, width: f64, alpha: f64) {
        self.commands.push(DrawCommand::StrokeArc {
            center,
            radius,
            paint: paint.clone(),
            width,
            alpha,
        });
    }

    fn line(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, at: DVec2, font_px: f64, paint: &Paint, alpha: f64) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            at,
            font_px,
            paint: paint.clone(),
            alpha,
        });
    }
}
