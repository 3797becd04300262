//! Scripted pointer paths for headless runs.

use std::f64::consts::TAU;

use clap::ValueEnum;
use molecular_core::engine::{Event, EventSource};
use molecular_core::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PointerScript {
    /// No pointer; particles stay idle.
    None,
    /// Orbit the viewport center once every 120 frames.
    Circle,
    /// Cross the viewport left to right along the middle over the whole run.
    Sweep,
}

const ORBIT_FRAMES: f64 = 120.0;

/// Emits one pointer event per frame.
///
/// The loop drains an event source until it is empty before every frame, so
/// each drain yields the frame's event and then `None`.
pub struct ScriptedPointer {
    script: PointerScript,
    viewport: Viewport,
    frames: usize,
    frame: usize,
    emitted: bool,
}

impl ScriptedPointer {
    pub fn new(script: PointerScript, viewport: Viewport, frames: usize) -> Self {
        Self {
            script,
            viewport,
            frames,
            frame: 0,
            emitted: false,
        }
    }

    fn position(&self, frame: usize) -> Option<(f64, f64)> {
        let center = self.viewport.center();
        match self.script {
            PointerScript::None => None,
            PointerScript::Circle => {
                let r = self.viewport.width().min(self.viewport.height()) / 4.0;
                let a = frame as f64 / ORBIT_FRAMES * TAU;
                Some((center.x + r * a.cos(), center.y + r * a.sin()))
            }
            PointerScript::Sweep => {
                let t = if self.frames > 1 {
                    frame as f64 / (self.frames - 1) as f64
                } else {
                    0.5
                };
                Some((t * self.viewport.width(), center.y))
            }
        }
    }
}

impl EventSource for ScriptedPointer {
    fn poll(&mut self) -> Option<Event> {
        if self.emitted {
            self.emitted = false;
            self.frame += 1;
            return None;
        }
        self.emitted = true;
        match self.position(self.frame) {
            Some((x, y)) => Some(Event::PointerMoved { x, y }),
            None => {
                self.emitted = false;
                self.frame += 1;
                None
            }
        }
    }
}
