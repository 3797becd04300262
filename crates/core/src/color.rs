//! 8-bit color types used by the sampler and the renderer.
//!
//! Field samples keep the literal channel values of the source pixel, so
//! colors here stay in 8-bit sRGB instead of a float working space. `Rgb8`
//! serializes as `"#rrggbb"`; parsing additionally accepts CSS `rgb(r, g, b)`
//! notation and the handful of named colors the built-in variants use.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// Opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// 8-bit sRGB color with a floating-point alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub rgb: Rgb8,
    pub alpha: f64,
}

/// CSS named colors referenced by the variant presets.
const NAMED: &[(&str, Rgb8)] = &[
    ("black", Rgb8::new(0, 0, 0)),
    ("white", Rgb8::new(255, 255, 255)),
    ("red", Rgb8::new(255, 0, 0)),
    ("green", Rgb8::new(0, 128, 0)),
    ("cyan", Rgb8::new(0, 255, 255)),
    ("orange", Rgb8::new(255, 165, 0)),
    ("yellow", Rgb8::new(255, 255, 0)),
    ("pink", Rgb8::new(255, 192, 203)),
    ("purple", Rgb8::new(128, 0, 128)),
    ("violet", Rgb8::new(238, 130, 238)),
    ("turquoise", Rgb8::new(64, 224, 208)),
    ("darkblue", Rgb8::new(0, 0, 139)),
];

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"#rrggbb"`, `"#rgb"`, `"rgb(r, g, b)"` or a known color name.
    pub fn parse(s: &str) -> Result<Rgb8, EngineError> {
        let s = s.trim();
        if s.starts_with('#') {
            return Rgb8::from_hex(s);
        }
        if let Some(body) = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_triplet(body);
        }
        let lower = s.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, c)| *c)
            .ok_or_else(|| EngineError::InvalidColor(format!("unrecognized color '{s}'")))
    }

    /// Parses a hex color such as `"#ff00aa"`, `"ff00aa"` or the short form `"#007"`.
    pub fn from_hex(hex: &str) -> Result<Rgb8, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            n => {
                return Err(EngineError::InvalidColor(format!(
                    "expected 3 or 6 hex digits, got {n}"
                )))
            }
        };
        let channel = |range: std::ops::Range<usize>, name: &str| {
            expanded
                .get(range)
                .ok_or_else(|| EngineError::InvalidColor(format!("non-ascii {name} component")))
                .and_then(|digits| {
                    u8::from_str_radix(digits, 16).map_err(|e| {
                        EngineError::InvalidColor(format!("invalid {name} component: {e}"))
                    })
                })
        };
        Ok(Rgb8 {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Formats as `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-average grayscale, rounded to the nearest integer.
    pub fn grayscale(self) -> Rgb8 {
        let avg = ((self.r as f64 + self.g as f64 + self.b as f64) / 3.0).round() as u8;
        Rgb8::new(avg, avg, avg)
    }

    /// Linear interpolation in 8-bit sRGB; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb8::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    pub fn with_alpha(self, alpha: f64) -> Rgba {
        Rgba::new(self, alpha)
    }
}

fn parse_rgb_triplet(body: &str) -> Result<Rgb8, EngineError> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(EngineError::InvalidColor(format!(
            "expected 3 components in rgb(), got {}",
            parts.len()
        )));
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let value: f64 = part
            .parse()
            .map_err(|_| EngineError::InvalidColor(format!("invalid rgb component '{part}'")))?;
        *slot = value.round().clamp(0.0, 255.0) as u8;
    }
    Ok(Rgb8::new(channels[0], channels[1], channels[2]))
}

/// Displays the bare channel triple, e.g. `255,255,255`.
impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb8::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Rgba {
    /// Creates a color with alpha clamped to [0, 1].
    pub fn new(rgb: Rgb8, alpha: f64) -> Self {
        Self {
            rgb,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn opaque(rgb: Rgb8) -> Self {
        Self { rgb, alpha: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb8::parse("#ff00aa").unwrap(), Rgb8::new(255, 0, 170));
        assert_eq!(Rgb8::parse("#007").unwrap(), Rgb8::new(0, 0, 0x77));
        assert_eq!(Rgb8::from_hex("00162f").unwrap(), Rgb8::new(0, 0x16, 0x2f));
    }

    #[test]
    fn parses_css_rgb_notation_with_spaces_and_floats() {
        assert_eq!(
            Rgb8::parse("rgb(245, 155, 235)").unwrap(),
            Rgb8::new(245, 155, 235)
        );
        assert_eq!(
            Rgb8::parse("rgb(84.6,84.6,84.6)").unwrap(),
            Rgb8::new(85, 85, 85)
        );
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(Rgb8::parse("Turquoise").unwrap(), Rgb8::new(64, 224, 208));
        assert_eq!(Rgb8::parse("darkBlue").unwrap(), Rgb8::new(0, 0, 139));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rgb8::parse("#12345").is_err());
        assert!(Rgb8::parse("rgb(1,2)").is_err());
        assert!(Rgb8::parse("chartreuse-ish").is_err());
        assert!(Rgb8::parse("#gg0000").is_err());
    }

    #[test]
    fn display_is_bare_triplet() {
        assert_eq!(Rgb8::WHITE.to_string(), "255,255,255");
        assert_eq!(Rgb8::parse("rgb(1, 2, 3)").unwrap().to_string(), "1,2,3");
    }

    #[test]
    fn grayscale_averages_channels() {
        assert_eq!(Rgb8::new(30, 60, 90).grayscale(), Rgb8::new(60, 60, 60));
        assert_eq!(Rgb8::new(255, 0, 0).grayscale(), Rgb8::new(85, 85, 85));
    }

    #[test]
    fn lerp_hits_endpoints_and_clamps() {
        let a = Rgb8::BLACK;
        let b = Rgb8::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb8::new(128, 128, 128));
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb8::new(0, 0, 119)).unwrap();
        assert_eq!(json, "\"#000077\"");
        let back: Rgb8 = serde_json::from_str("\"rgb(0, 0, 119)\"").unwrap();
        assert_eq!(back, Rgb8::new(0, 0, 119));
    }

    #[test]
    fn rgba_alpha_is_clamped() {
        assert_eq!(Rgba::new(Rgb8::BLACK, 1.5).alpha, 1.0);
        assert_eq!(Rgba::new(Rgb8::BLACK, -0.5).alpha, 0.0);
    }
}
