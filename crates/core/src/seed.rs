//! Reproducible record of a simulation run.
//!
//! A [`Seed`] captures everything needed to replay a run headlessly:
//! variant name, viewport, parameter overrides, PRNG seed and frame count.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Reproducible description of a run.
///
/// Two identical `Seed` values fed to the same binary with the same raster
/// and pointer script produce identical frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub variant: String,
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub frames: usize,
}

impl Seed {
    /// Creates a new Seed with empty params (`{}`) and zero frames.
    pub fn new(variant: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            variant: variant.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            frames: 0,
        }
    }

    /// Validates that the viewport is non-empty and `width * height` does not overflow.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.params.is_object() {
            return Err(EngineError::invalid_param("params", "must be a JSON object"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_with_empty_params() {
        let s = Seed::new("text-dots", 800, 600, 42);
        assert_eq!(s.variant, "text-dots");
        assert_eq!(s.frames, 0);
        assert_eq!(s.params, serde_json::json!({}));
    }

    #[test]
    fn json_round_trip_with_overrides() {
        let mut s = Seed::new("zero-g", 1024, 768, 8675309);
        s.params = serde_json::json!({ "radius": 150.0, "connect": true });
        s.frames = 240;
        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn validate_rejects_empty_viewport() {
        assert!(Seed::new("dots", 0, 10, 1).validate().is_err());
        assert!(Seed::new("dots", 10, 0, 1).validate().is_err());
        assert!(Seed::new("dots", usize::MAX, 2, 1).validate().is_err());
        assert!(Seed::new("dots", 10, 10, 1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_object_params() {
        let mut s = Seed::new("dots", 10, 10, 1);
        s.params = serde_json::json!([1, 2]);
        assert!(s.validate().is_err());
    }
}
