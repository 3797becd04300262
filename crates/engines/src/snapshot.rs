//! PNG input and output.
//!
//! This module is feature-gated behind `png` (default on) so that embedders
//! can depend on the `engines` crate without pulling in the `image` crate.
//! The canvas itself lives in [`crate::pixel`] (always available).

use molecular_core::error::EngineError;
use molecular_core::Raster;
use std::path::Path;

use crate::pixel::PixelCanvas;

/// Writes the canvas as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the canvas dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(canvas: &PixelCanvas, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(canvas.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(canvas.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, canvas.as_rgba().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

/// Decodes a PNG file into an RGBA8 raster.
pub fn load_raster(path: &Path) -> Result<Raster, EngineError> {
    let img = image::open(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Raster::new(w as usize, h as usize, img.into_raw())
}
