//! Error types for the molecular core.
//!
//! The error surface is narrow: degenerate geometry, stale field
//! lookups and an absent pointer are recovered inside the simulation and never
//! reach this type. Only construction and host I/O failures do.

use thiserror::Error;

/// Errors produced while building or driving a simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or not finite) when creating a raster, grid or viewport.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// An RGBA buffer did not hold exactly `width * height * 4` bytes.
    #[error("raster buffer has {got} bytes, expected {expected} for {width}x{height} RGBA")]
    RasterSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },

    /// A configuration value was outside its valid domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A variant name was not found in the registry.
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The host raster source failed to produce a raster.
    #[error("raster source failed: {0}")]
    Source(String),

    /// File or encoder failure (snapshots).
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParam`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParam {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
