//! Field Grid: per-pixel brightness and color addressed by particle position.
//!
//! Field-driven rain variants look up the cell under a particle every frame
//! via `floor(y)`, `floor(x)`. Particles routinely drift past the sampled
//! area, so [`FieldGrid::get`] returns `None` instead of wrapping or panicking
//! and callers keep their last cached value.

use crate::color::Rgb8;
use crate::error::EngineError;
use crate::sampler::{relative_brightness, Raster};

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldCell {
    pub brightness: f64,
    pub color: Rgb8,
}

/// Row-major grid of [`FieldCell`]s covering a whole raster.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    cells: Vec<FieldCell>,
}

impl FieldGrid {
    /// Builds a grid from every pixel of the raster, ignoring alpha.
    pub fn from_raster(raster: &Raster) -> Self {
        let cells = raster
            .pixels()
            .map(|(_, _, [r, g, b, _])| FieldCell {
                brightness: relative_brightness(r, g, b),
                color: Rgb8::new(r, g, b),
            })
            .collect();
        Self {
            width: raster.width(),
            height: raster.height(),
            cells,
        }
    }

    /// Builds a grid from pre-computed cells, validating `cells.len() == width * height`.
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<FieldCell>,
    ) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        if cells.len() != expected {
            return Err(EngineError::invalid_param(
                "cells",
                format!("expected {expected} cells, got {}", cells.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at integer `(col, row)`.
    pub fn cell(&self, col: usize, row: usize) -> Option<&FieldCell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    /// Cell under the continuous position `(x, y)`, addressed as `[floor(y)][floor(x)]`.
    ///
    /// Negative, non-finite or out-of-range positions return `None`.
    pub fn get(&self, x: f64, y: f64) -> Option<&FieldCell> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let (col, row) = (x.floor(), y.floor());
        if col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }
        self.cell(col as usize, row as usize)
    }
}
