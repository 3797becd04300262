//! Lenient extraction of typed overrides from a JSON params object.
//!
//! Variant presets accept a JSON object of overrides (`{"radius": 80}`). Each
//! helper returns the default when the key is missing or has the wrong type,
//! so a partially valid override object still produces a usable config.

use serde_json::Value;

/// Reads `params[name]` as f64 (integers accepted).
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads `params[name]` as an integer in 0..=255.
pub fn param_u8(params: &Value, name: &str, default: u8) -> u8 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u8::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads `params[name]` as a two-element numeric array `[min, max]`.
///
/// Falls back to `default` unless both entries are numbers and `min <= max`.
pub fn param_interval(params: &Value, name: &str, default: (f64, f64)) -> (f64, f64) {
    let Some(items) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    match items.as_slice() {
        [lo, hi] => match (lo.as_f64(), hi.as_f64()) {
            (Some(lo), Some(hi)) if lo <= hi => (lo, hi),
            _ => default,
        },
        _ => default,
    }
}
